//! Pear service: turns slash commands and button clicks into seeds, pears,
//! and Slack messages.
//!
//! # Flow
//!
//! 1. `/pear <topic>` returns an ephemeral confirm/cancel prompt (nothing stored)
//! 2. Confirm stores a seed, acknowledges via `response_url`, announces in the channel
//! 3. Pick stores a pear, rewrites the announcement, and DMs the requester
//!
//! Writes are not transactional with the Slack calls that follow them. A
//! stored seed whose announcement fails stays stored; the error is returned
//! and nothing is retried.

use chrono::Utc;
use pear_core::{ActionKind, SeedId};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::db::{PearStore, RepositoryError};
use crate::models::Seed;
use crate::slack::{
    ChatApi, InteractionAction, InteractionPayload, ResponseMessage, SlackError, SlashCommand,
    announcement_text, build_announcement, build_delete_original, build_fulfilled_message,
    build_fulfilled_notification, build_history_message, build_request_prompt,
    build_request_recorded,
};

/// Slash command text that lists the caller's history instead of creating a request.
pub const LIST_COMMAND: &str = "list";

/// Errors from handling a command or interaction.
#[derive(Debug, Error)]
pub enum PearError {
    /// The interaction did not carry exactly one block action.
    #[error("invalid number of actions: {0}")]
    InvalidActionCount(usize),

    /// Confirm was clicked without a topic.
    #[error("topic required")]
    MissingTopic,

    /// The pick button's value was not a seed ID.
    #[error("invalid seed id: {0:?}")]
    InvalidSeedId(String),

    /// The interaction has no `response_url` to reply to.
    #[error("interaction has no response_url")]
    MissingResponseUrl,

    /// The announcement being picked has no section text to keep.
    #[error("unable to find section block in original message")]
    MissingSectionText,

    /// The picked seed no longer exists.
    #[error("seed {0} not found")]
    SeedNotFound(SeedId),

    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Slack API call failed.
    #[error(transparent)]
    Slack(#[from] SlackError),
}

impl PearError {
    /// Whether the error was caused by a malformed inbound payload.
    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidActionCount(_)
                | Self::MissingTopic
                | Self::InvalidSeedId(_)
                | Self::MissingResponseUrl
        )
    }
}

/// Handles slash commands and interactions.
#[derive(Debug)]
pub struct PearService<S, C> {
    store: S,
    chat: C,
    channel: String,
}

impl<S: PearStore, C: ChatApi> PearService<S, C> {
    /// Create a new service announcing seeds in `channel`.
    #[must_use]
    pub fn new(store: S, chat: C, channel: impl Into<String>) -> Self {
        Self {
            store,
            chat,
            channel: channel.into(),
        }
    }

    /// Get the store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Get the chat client.
    #[must_use]
    pub const fn chat(&self) -> &C {
        &self.chat
    }

    /// Get the announcement channel ID.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Handle `/pear <text>`.
    ///
    /// `list` returns the caller's fulfillment history; anything else is
    /// treated as a topic and returns a confirmation prompt.
    ///
    /// # Errors
    ///
    /// Returns error if the history query fails.
    #[instrument(skip(self, command), fields(user = %command.user_id))]
    pub async fn handle_new(&self, command: &SlashCommand) -> Result<ResponseMessage, PearError> {
        if command.text.trim() == LIST_COMMAND {
            debug!("Listing fulfilled seeds");
            return self.history(&command.user_id).await;
        }

        Ok(build_request_prompt(&command.text))
    }

    /// Ephemeral listing of every seed `user` has picked.
    ///
    /// # Errors
    ///
    /// Returns error if the history query fails.
    pub async fn history(&self, user: &str) -> Result<ResponseMessage, PearError> {
        let history = self.store.list_fulfilled_by(user).await?;
        Ok(build_history_message(&history))
    }

    /// Handle a button click.
    ///
    /// # Errors
    ///
    /// Returns `PearError::InvalidActionCount` before touching the store if
    /// the payload does not carry exactly one action. Otherwise returns the
    /// first failure of the dispatched branch; side effects already made by
    /// that branch are kept.
    #[instrument(skip(self, payload), fields(user = %payload.user.id))]
    pub async fn handle_submit(&self, payload: &InteractionPayload) -> Result<(), PearError> {
        let [action] = payload.actions.as_slice() else {
            return Err(PearError::InvalidActionCount(payload.actions.len()));
        };
        let response_url = payload
            .response_url
            .as_deref()
            .ok_or(PearError::MissingResponseUrl)?;

        let kind = ActionKind::from_action_id(&action.action_id);
        debug!(action = %action.action_id, ?kind, "Dispatching interaction");

        match kind {
            ActionKind::ConfirmRequest => {
                self.confirm_request(payload, action, response_url).await?;
            }
            ActionKind::CancelRequest => {
                debug!("Canceling seed");
                self.chat
                    .respond(response_url, &build_delete_original())
                    .await?;
            }
            ActionKind::FulfillRequest => {
                self.fulfill_request(payload, action, response_url).await?;
            }
            ActionKind::Unknown => {
                debug!(action = %action.action_id, "Unknown action, removing message");
                self.chat
                    .respond(response_url, &build_delete_original())
                    .await?;
            }
        }

        Ok(())
    }

    /// Store a seed, acknowledge it, then announce it.
    async fn confirm_request(
        &self,
        payload: &InteractionPayload,
        action: &InteractionAction,
        response_url: &str,
    ) -> Result<Seed, PearError> {
        let topic = action
            .value
            .as_deref()
            .map(str::trim)
            .filter(|topic| !topic.is_empty())
            .ok_or(PearError::MissingTopic)?;

        let seed = self
            .store
            .insert_seed(&payload.user.id, topic, Utc::now())
            .await?;
        info!(seed_id = %seed.id, requester = %seed.requester, "Seed planted");

        self.chat
            .respond(response_url, &build_request_recorded())
            .await?;

        if let Err(e) = self
            .chat
            .post_message(
                &self.channel,
                build_announcement(&seed),
                Some(&announcement_text(&seed)),
            )
            .await
        {
            error!(seed_id = %seed.id, error = %e, "Error posting seed announcement");
            return Err(e.into());
        }

        Ok(seed)
    }

    /// Store a pear, rewrite the announcement, and notify the requester.
    async fn fulfill_request(
        &self,
        payload: &InteractionPayload,
        action: &InteractionAction,
        response_url: &str,
    ) -> Result<(), PearError> {
        let raw_id = action.value.clone().unwrap_or_default();
        let seed_id: SeedId = raw_id
            .parse()
            .map_err(|_| PearError::InvalidSeedId(raw_id.clone()))?;
        let fulfiller = payload.user.id.as_str();

        let pear = self
            .store
            .insert_pear(seed_id, fulfiller, Utc::now())
            .await?;
        info!(pear_id = %pear.id, seed_id = %seed_id, fulfiller = %fulfiller, "Pear picked");

        let original_text = payload
            .message
            .as_ref()
            .and_then(|message| message.first_section_text())
            .cloned()
            .ok_or(PearError::MissingSectionText)?;

        self.chat
            .respond(
                response_url,
                &build_fulfilled_message(original_text, fulfiller),
            )
            .await?;

        let seed = self
            .store
            .get_seed(seed_id)
            .await?
            .ok_or(PearError::SeedNotFound(seed_id))?;

        let channel = self
            .chat
            .open_conversation(&[fulfiller, seed.requester.as_str()])
            .await?;

        self.chat
            .post_text(&channel, &build_fulfilled_notification(&seed, fulfiller))
            .await?;

        debug!(channel = %channel, "Requester notified");

        Ok(())
    }
}
