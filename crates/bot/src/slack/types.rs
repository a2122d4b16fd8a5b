//! Slack Block Kit types and inbound webhook payloads.
//!
//! Outbound types represent the subset of Block Kit Pear renders. Inbound
//! types cover slash commands and block-action interactions, including the
//! blocks of the message the clicked button lives in.
//!
//! See: <https://api.slack.com/block-kit>

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::SlackError;

/// A Slack message with blocks.
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    /// Channel ID to post to.
    pub channel: String,
    /// Message blocks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    /// Optional plain text fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Block Kit block types.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Section block with text and optional accessory.
    Section {
        text: Text,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    /// Context block with small muted text.
    Context { elements: Vec<ContextElement> },
    /// Actions block with interactive elements.
    Actions {
        #[serde(skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        elements: Vec<ActionElement>,
    },
}

impl Block {
    /// Create a section block holding only markdown text.
    #[must_use]
    pub fn mrkdwn_section(text: impl Into<String>) -> Self {
        Self::Section {
            text: Text::mrkdwn(text),
            accessory: None,
        }
    }
}

/// Text object types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Plain text (no formatting).
    PlainText {
        text: String,
        #[serde(default)]
        emoji: bool,
    },
    /// Markdown text (supports formatting).
    Mrkdwn { text: String },
}

impl Text {
    /// Create a plain text object.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    /// Create a markdown text object.
    #[must_use]
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    /// The raw text content, regardless of formatting.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PlainText { text, .. } | Self::Mrkdwn { text } => text,
        }
    }
}

/// Plain text object (for button labels).
#[derive(Debug, Clone, Serialize)]
pub struct PlainText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl PlainText {
    /// Create a new plain text object.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text",
            text: text.into(),
            emoji: true,
        }
    }
}

/// Context block elements.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextElement {
    /// Markdown text in context.
    Mrkdwn { text: String },
}

/// Accessory elements for section blocks.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessory {
    /// Button accessory.
    Button {
        text: PlainText,
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<ButtonStyle>,
    },
}

/// Action block elements.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionElement {
    /// Interactive button.
    Button {
        text: PlainText,
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<ButtonStyle>,
    },
}

/// Button style (affects color).
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// Green primary button.
    Primary,
}

/// Who can see a slash command or `response_url` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only the invoking user.
    Ephemeral,
}

/// A reply to a slash command, or a message sent to a `response_url`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub replace_original: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub delete_original: bool,
}

// =============================================================================
// Response Types
// =============================================================================

/// Response from posting a message.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Channel ID where message was posted.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp (unique ID).
    #[serde(default)]
    pub ts: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `conversations.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenConversationResponse {
    pub ok: bool,
    #[serde(default)]
    pub channel: Option<ConversationChannel>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Channel returned by `conversations.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationChannel {
    pub id: String,
}

// =============================================================================
// Inbound Webhooks
// =============================================================================

/// Slash command invocation, posted as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashCommand {
    /// The command that was typed (e.g. `/pear`).
    pub command: String,
    /// Free text after the command.
    pub text: String,
    /// Slack user ID of the invoking user.
    pub user_id: String,
}

impl SlashCommand {
    /// Parse a slash command from its form-encoded body.
    ///
    /// # Errors
    ///
    /// Returns `SlackError::InvalidPayload` if `user_id` is missing.
    pub fn from_form(body: &[u8]) -> Result<Self, SlackError> {
        let mut fields: HashMap<String, String> = url::form_urlencoded::parse(body)
            .into_owned()
            .collect();

        let user_id = fields
            .remove("user_id")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SlackError::InvalidPayload("missing user_id".to_string()))?;

        Ok(Self {
            command: fields.remove("command").unwrap_or_default(),
            text: fields.remove("text").unwrap_or_default(),
            user_id,
        })
    }
}

/// Slack interaction payload from button clicks.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    /// Type of interaction.
    #[serde(rename = "type")]
    pub interaction_type: String,
    /// User who triggered the interaction.
    pub user: InteractionUser,
    /// Actions that were triggered.
    #[serde(default)]
    pub actions: Vec<InteractionAction>,
    /// Response URL for updating the message.
    #[serde(default)]
    pub response_url: Option<String>,
    /// The message containing the clicked button.
    #[serde(default)]
    pub message: Option<InteractionMessage>,
}

impl InteractionPayload {
    /// Parse an interaction from its form-encoded body (`payload=<json>`).
    ///
    /// # Errors
    ///
    /// Returns `SlackError::InvalidPayload` if the `payload` field is missing
    /// or is not a valid interaction.
    pub fn from_form(body: &[u8]) -> Result<Self, SlackError> {
        let payload = url::form_urlencoded::parse(body)
            .find(|(key, _)| key == "payload")
            .map(|(_, value)| value)
            .ok_or_else(|| SlackError::InvalidPayload("missing payload".to_string()))?;

        serde_json::from_str(&payload)
            .map_err(|e| SlackError::InvalidPayload(format!("unable to parse interaction: {e}")))
    }
}

/// User who triggered an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    /// Slack user ID.
    pub id: String,
}

/// Action that was triggered.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionAction {
    /// Action ID (set when creating the button).
    pub action_id: String,
    /// Value attached to the action.
    #[serde(default)]
    pub value: Option<String>,
}

/// The message a clicked button belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionMessage {
    #[serde(default)]
    pub blocks: Vec<MessageBlock>,
}

impl InteractionMessage {
    /// Text of the first section block that has any.
    #[must_use]
    pub fn first_section_text(&self) -> Option<&Text> {
        self.blocks.iter().find_map(|block| match block {
            MessageBlock::Section { text } => text.as_ref(),
            MessageBlock::Other => None,
        })
    }
}

/// A block of an existing message, as echoed back by Slack.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBlock {
    /// Section block. Sections built only from fields carry no text.
    Section {
        #[serde(default)]
        text: Option<Text>,
    },
    /// Any block kind Pear does not read.
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form_encode(pairs: &[(&str, &str)]) -> Vec<u8> {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
            .into_bytes()
    }

    #[test]
    fn test_slash_command_from_form() {
        let body = form_encode(&[
            ("command", "/pear"),
            ("text", "learn Go"),
            ("user_id", "U123"),
            ("channel_id", "C456"),
            ("response_url", "https://hooks.slack.com/commands/1"),
        ]);

        let command = SlashCommand::from_form(&body).expect("valid command");
        assert_eq!(command.command, "/pear");
        assert_eq!(command.text, "learn Go");
        assert_eq!(command.user_id, "U123");
    }

    #[test]
    fn test_slash_command_missing_user() {
        let body = form_encode(&[("text", "list")]);
        let result = SlashCommand::from_form(&body);
        assert!(matches!(result, Err(SlackError::InvalidPayload(_))));
    }

    #[test]
    fn test_interaction_from_form() {
        let payload = json!({
            "type": "block_actions",
            "user": {"id": "U1", "username": "ana"},
            "response_url": "https://hooks.slack.com/actions/1",
            "actions": [{"action_id": "submit-seed", "block_id": "seed-block", "value": "Rust", "type": "button"}]
        });
        let body = form_encode(&[("payload", &payload.to_string())]);

        let interaction = InteractionPayload::from_form(&body).expect("valid interaction");
        assert_eq!(interaction.user.id, "U1");
        assert_eq!(interaction.actions.len(), 1);
        assert_eq!(interaction.actions[0].value.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_interaction_missing_payload_field() {
        let body = form_encode(&[("other", "x")]);
        assert!(matches!(
            InteractionPayload::from_form(&body),
            Err(SlackError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_interaction_invalid_json() {
        let body = form_encode(&[("payload", "{not json")]);
        assert!(matches!(
            InteractionPayload::from_form(&body),
            Err(SlackError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_first_section_text_skips_other_blocks() {
        let message: InteractionMessage = serde_json::from_value(json!({
            "ts": "1.2",
            "blocks": [
                {"type": "divider", "block_id": "d"},
                {"type": "section", "fields": [{"type": "mrkdwn", "text": "f"}]},
                {"type": "section", "text": {"type": "mrkdwn", "text": "<@U1> wants to learn Rust.", "verbatim": false},
                 "accessory": {"type": "button", "action_id": "pick-pear", "text": {"type": "plain_text", "text": "Fulfill"}}},
                {"type": "section", "text": {"type": "mrkdwn", "text": "second"}}
            ]
        }))
        .expect("valid message");

        let text = message.first_section_text().expect("has section text");
        assert_eq!(text.as_str(), "<@U1> wants to learn Rust.");
    }

    #[test]
    fn test_first_section_text_none() {
        let message: InteractionMessage = serde_json::from_value(json!({
            "blocks": [{"type": "context", "elements": []}]
        }))
        .expect("valid message");
        assert!(message.first_section_text().is_none());
    }

    #[test]
    fn test_response_message_skips_false_flags() {
        let message = ResponseMessage {
            delete_original: true,
            ..ResponseMessage::default()
        };
        let value = serde_json::to_value(&message).expect("serializes");
        assert_eq!(value, json!({"delete_original": true}));
    }
}
