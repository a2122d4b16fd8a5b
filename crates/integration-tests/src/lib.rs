//! Integration tests for the pear bot.
//!
//! # Running Tests
//!
//! ```bash
//! # Router and service tests (no external services)
//! cargo test -p pear-integration-tests
//!
//! # Database tests against a scratch PostgreSQL
//! PEAR_TEST_DATABASE_URL=postgres://localhost/pear_test \
//!     cargo test -p pear-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `routes` - Signed requests through the full axum router
//! - `service` - Interaction dispatch against the fakes
//! - `slack_messages` - Block Kit message shapes
//! - `database` - `PearRepository` against a real database
//!
//! The fakes here stand in for the two outbound seams, [`PearStore`] and
//! [`ChatApi`]. Both record every call so tests can assert that nothing
//! downstream ran.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::body::Body;
use axum::http::{Request, header};
use chrono::{DateTime, Utc};
use pear_bot::db::{PearStore, RepositoryError};
use pear_bot::models::{FulfilledSeed, Pear, Seed};
use pear_bot::services::PearService;
use pear_bot::slack::{
    Block, ChatApi, PostMessageResponse, ResponseMessage, SIGNATURE_HEADER, SignatureVerifier,
    SlackError, TIMESTAMP_HEADER, unix_now,
};
use pear_bot::state::AppState;
use pear_core::{PearId, SeedId};
use secrecy::SecretString;

/// Signing secret shared by every test request.
pub const SIGNING_SECRET: &str = "8f14e45fceea167a5a36dedd4bea2543";

/// Announcement channel used by the test service.
pub const CHANNEL: &str = "C0PEARS";

/// Direct-message channel the fake returns from `conversations.open`.
pub const DM_CHANNEL: &str = "D0PEARDM";

/// Response URL used in test interactions.
pub const RESPONSE_URL: &str = "https://hooks.slack.test/actions/T1/1/abc";

/// State type the routes run with in tests.
pub type TestState = AppState<FakeStore, RecordingChat>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    seeds: Vec<Seed>,
    pears: Vec<Pear>,
}

/// In-memory [`PearStore`] enforcing the same constraints as the schema.
#[derive(Debug, Default)]
pub struct FakeStore {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
    unavailable: AtomicBool,
}

impl FakeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of store operations invoked, reads and writes alike.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of stored seeds.
    #[must_use]
    pub fn seeds(&self) -> Vec<Seed> {
        lock(&self.tables).seeds.clone()
    }

    /// Snapshot of stored pears.
    #[must_use]
    pub fn pears(&self) -> Vec<Pear> {
        lock(&self.tables).pears.clone()
    }

    /// Make every operation fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn enter(&self) -> Result<MutexGuard<'_, Tables>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(lock(&self.tables))
    }
}

fn next_id(len: usize) -> i32 {
    i32::try_from(len).map_or(i32::MAX, |n| n + 1)
}

impl PearStore for FakeStore {
    async fn insert_seed(
        &self,
        requester: &str,
        topic: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Seed, RepositoryError> {
        let mut tables = self.enter()?;
        if topic.is_empty() {
            return Err(RepositoryError::Conflict("seed_topic_check".to_string()));
        }

        let seed = Seed {
            id: SeedId::new(next_id(tables.seeds.len())),
            requester: requester.to_string(),
            topic: topic.to_string(),
            created_at,
        };
        tables.seeds.push(seed.clone());
        Ok(seed)
    }

    async fn get_seed(&self, id: SeedId) -> Result<Option<Seed>, RepositoryError> {
        let tables = self.enter()?;
        Ok(tables.seeds.iter().find(|seed| seed.id == id).cloned())
    }

    async fn insert_pear(
        &self,
        seed_id: SeedId,
        fulfiller: &str,
        fulfilled_at: DateTime<Utc>,
    ) -> Result<Pear, RepositoryError> {
        let mut tables = self.enter()?;
        if !tables.seeds.iter().any(|seed| seed.id == seed_id) {
            return Err(RepositoryError::Conflict("pear_seed_id_fkey".to_string()));
        }
        if tables.pears.iter().any(|pear| pear.seed_id == seed_id) {
            return Err(RepositoryError::Conflict("pear_seed_id_key".to_string()));
        }

        let pear = Pear {
            id: PearId::new(next_id(tables.pears.len())),
            seed_id,
            fulfiller: fulfiller.to_string(),
            fulfilled_at,
        };
        tables.pears.push(pear.clone());
        Ok(pear)
    }

    async fn list_fulfilled_by(
        &self,
        fulfiller: &str,
    ) -> Result<Vec<FulfilledSeed>, RepositoryError> {
        let tables = self.enter()?;
        Ok(tables
            .pears
            .iter()
            .filter(|pear| pear.fulfiller == fulfiller)
            .filter_map(|pear| {
                tables
                    .seeds
                    .iter()
                    .find(|seed| seed.id == pear.seed_id)
                    .map(|seed| FulfilledSeed {
                        requester: seed.requester.clone(),
                        topic: seed.topic.clone(),
                        fulfilled_at: pear.fulfilled_at,
                    })
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.enter().map(drop)
    }
}

// =============================================================================
// Chat
// =============================================================================

/// One outbound Slack call, with messages captured as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Respond {
        response_url: String,
        message: serde_json::Value,
    },
    PostMessage {
        channel: String,
        blocks: serde_json::Value,
        text: Option<String>,
    },
    PostText {
        channel: String,
        text: String,
    },
    OpenConversation {
        users: Vec<String>,
    },
}

/// [`ChatApi`] that records calls instead of sending them.
#[derive(Debug, Default)]
pub struct RecordingChat {
    calls: Mutex<Vec<ChatCall>>,
    fail_post_message: AtomicBool,
}

impl RecordingChat {
    /// Create a recorder where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `post_message` fail with a Slack API error.
    pub fn fail_post_message(&self) {
        self.fail_post_message.store(true, Ordering::SeqCst);
    }

    /// Snapshot of recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ChatCall> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: ChatCall) {
        lock(&self.calls).push(call);
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or(serde_json::Value::Null)
}

fn posted(channel: &str) -> PostMessageResponse {
    PostMessageResponse {
        ok: true,
        channel: Some(channel.to_string()),
        ts: Some("1700000000.000100".to_string()),
        error: None,
    }
}

impl ChatApi for RecordingChat {
    async fn respond(&self, response_url: &str, message: &ResponseMessage) -> Result<(), SlackError> {
        self.record(ChatCall::Respond {
            response_url: response_url.to_string(),
            message: to_json(message),
        });
        Ok(())
    }

    async fn post_message(
        &self,
        channel: &str,
        blocks: Vec<Block>,
        text: Option<&str>,
    ) -> Result<PostMessageResponse, SlackError> {
        self.record(ChatCall::PostMessage {
            channel: channel.to_string(),
            blocks: to_json(&blocks),
            text: text.map(ToString::to_string),
        });
        if self.fail_post_message.load(Ordering::SeqCst) {
            return Err(SlackError::Api("channel_not_found".to_string()));
        }
        Ok(posted(channel))
    }

    async fn post_text(&self, channel: &str, text: &str) -> Result<PostMessageResponse, SlackError> {
        self.record(ChatCall::PostText {
            channel: channel.to_string(),
            text: text.to_string(),
        });
        Ok(posted(channel))
    }

    async fn open_conversation(&self, users: &[&str]) -> Result<String, SlackError> {
        self.record(ChatCall::OpenConversation {
            users: users.iter().map(ToString::to_string).collect(),
        });
        Ok(DM_CHANNEL.to_string())
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Verifier for [`SIGNING_SECRET`].
#[must_use]
pub fn verifier() -> SignatureVerifier {
    SignatureVerifier::new(SecretString::from(SIGNING_SECRET))
}

/// Service over fresh fakes.
#[must_use]
pub fn service() -> PearService<FakeStore, RecordingChat> {
    PearService::new(FakeStore::new(), RecordingChat::new(), CHANNEL)
}

/// Router state over fresh fakes.
#[must_use]
pub fn state() -> TestState {
    AppState::new(service(), verifier())
}

/// Form-encode `fields`.
#[must_use]
pub fn form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

/// Slash command body for `/pear <text>` from `user`.
#[must_use]
pub fn slash_command_body(user: &str, text: &str) -> String {
    form(&[
        ("command", "/pear"),
        ("text", text),
        ("user_id", user),
        ("channel_id", CHANNEL),
        ("response_url", RESPONSE_URL),
    ])
}

/// Interaction body wrapping `payload` the way Slack does.
#[must_use]
pub fn interaction_body(payload: &serde_json::Value) -> String {
    let json = payload.to_string();
    form(&[("payload", json.as_str())])
}

/// Block-actions payload with the given `(action_id, value)` pairs.
#[must_use]
pub fn block_actions(user: &str, actions: &[(&str, &str)]) -> serde_json::Value {
    let actions: Vec<serde_json::Value> = actions
        .iter()
        .map(|(action_id, value)| {
            serde_json::json!({
                "action_id": action_id,
                "block_id": pear_core::SEED_BLOCK_ID,
                "value": value,
            })
        })
        .collect();

    serde_json::json!({
        "type": "block_actions",
        "user": { "id": user, "username": user.to_lowercase() },
        "channel": { "id": CHANNEL },
        "actions": actions,
        "response_url": RESPONSE_URL,
    })
}

/// Add the announcement message a pick button lives in.
#[must_use]
pub fn with_message(mut payload: serde_json::Value, section_text: Option<&str>) -> serde_json::Value {
    let mut blocks = Vec::new();
    if let Some(text) = section_text {
        blocks.push(serde_json::json!({
            "type": "section",
            "block_id": "announce",
            "text": { "type": "mrkdwn", "text": text, "verbatim": false },
            "accessory": { "type": "button", "action_id": "pick-pear" },
        }));
    }
    blocks.push(serde_json::json!({
        "type": "divider",
        "block_id": "div",
    }));

    if let Some(fields) = payload.as_object_mut() {
        fields.insert(
            "message".to_string(),
            serde_json::json!({
                "type": "message",
                "ts": "1700000000.000100",
                "text": section_text.unwrap_or_default(),
                "blocks": blocks,
            }),
        );
    }
    payload
}

/// Sign `body` at `timestamp` with [`SIGNING_SECRET`].
#[must_use]
pub fn signature(timestamp: i64, body: &str) -> String {
    verifier()
        .sign(&timestamp.to_string(), body.as_bytes())
        .unwrap_or_default()
}

/// POST `body` to `path` with a valid signature for the current time.
#[must_use]
pub fn signed_post(path: &str, body: &str) -> Request<Body> {
    let timestamp = unix_now().unwrap_or_default();
    signed_post_at(path, body, timestamp)
}

/// POST `body` to `path` signed at `timestamp`.
#[must_use]
pub fn signed_post_at(path: &str, body: &str, timestamp: i64) -> Request<Body> {
    Request::post(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(TIMESTAMP_HEADER, timestamp.to_string())
        .header(SIGNATURE_HEADER, signature(timestamp, body))
        .body(Body::from(body.to_string()))
        .unwrap_or_default()
}
