//! Slack message builders for the seed/pear flow.
//!
//! Provides factory functions for building Block Kit messages for:
//! - The confirm/cancel prompt shown after `/pear <topic>`
//! - The ephemeral acknowledgment once a seed is recorded
//! - The channel announcement with its fulfill button
//! - The announcement replacement once someone fulfills it
//! - A user's fulfillment history

use std::fmt::Write as _;

use pear_core::{ActionKind, SEED_BLOCK_ID};

use super::types::{
    Accessory, ActionElement, Block, ButtonStyle, ContextElement, PlainText, ResponseMessage,
    ResponseType, Text,
};
use crate::models::{FulfilledSeed, Seed};

/// Build the ephemeral confirmation prompt for a new request.
///
/// The confirm button carries the topic as its value so nothing has to be
/// stored until the user confirms.
#[must_use]
pub fn build_request_prompt(topic: &str) -> ResponseMessage {
    ResponseMessage {
        response_type: Some(ResponseType::Ephemeral),
        blocks: vec![
            Block::mrkdwn_section(format!("Do you want to learn *{topic}*?")),
            Block::Actions {
                block_id: Some(SEED_BLOCK_ID.to_string()),
                elements: vec![
                    ActionElement::Button {
                        text: PlainText::new("Yes"),
                        action_id: ActionKind::ConfirmRequest.action_id().to_string(),
                        value: Some(topic.to_string()),
                        style: Some(ButtonStyle::Primary),
                    },
                    ActionElement::Button {
                        text: PlainText::new("Cancel"),
                        action_id: ActionKind::CancelRequest.action_id().to_string(),
                        value: Some("cancel".to_string()),
                        style: None,
                    },
                ],
            },
        ],
        ..ResponseMessage::default()
    }
}

/// Build the acknowledgment that replaces the prompt once a seed is stored.
#[must_use]
pub fn build_request_recorded() -> ResponseMessage {
    ResponseMessage {
        response_type: Some(ResponseType::Ephemeral),
        blocks: vec![Block::mrkdwn_section("Pear seed planted! :seedling:")],
        replace_original: true,
        ..ResponseMessage::default()
    }
}

/// Build the public channel announcement for a seed.
#[must_use]
pub fn build_announcement(seed: &Seed) -> Vec<Block> {
    vec![Block::Section {
        text: Text::mrkdwn(announcement_text(seed)),
        accessory: Some(Accessory::Button {
            text: PlainText::new("Pick :pear:"),
            action_id: ActionKind::FulfillRequest.action_id().to_string(),
            value: Some(seed.id.to_string()),
            style: None,
        }),
    }]
}

/// Plain text of the announcement, also used as the notification fallback.
#[must_use]
pub fn announcement_text(seed: &Seed) -> String {
    format!(
        "<@{}> wants to learn {}. :seedling:",
        seed.requester, seed.topic
    )
}

/// Build the replacement for an announcement someone fulfilled.
///
/// Keeps the announcement's own text and drops its button.
#[must_use]
pub fn build_fulfilled_message(original_text: Text, fulfiller: &str) -> ResponseMessage {
    ResponseMessage {
        blocks: vec![
            Block::Section {
                text: original_text,
                accessory: None,
            },
            Block::Context {
                elements: vec![ContextElement::Mrkdwn {
                    text: format!("<@{fulfiller}> fulfilled this request."),
                }],
            },
        ],
        replace_original: true,
        ..ResponseMessage::default()
    }
}

/// Direct message telling a requester who offered to help.
#[must_use]
pub fn build_fulfilled_notification(seed: &Seed, fulfiller: &str) -> String {
    format!(
        "<@{}>, <@{fulfiller}> offered to help you learn {}!\nBear fruit! :pear:",
        seed.requester, seed.topic
    )
}

/// Build the response that removes the message a button was clicked in.
#[must_use]
pub fn build_delete_original() -> ResponseMessage {
    ResponseMessage {
        delete_original: true,
        ..ResponseMessage::default()
    }
}

/// Build the ephemeral `list` response.
#[must_use]
pub fn build_history_message(history: &[FulfilledSeed]) -> ResponseMessage {
    ResponseMessage {
        response_type: Some(ResponseType::Ephemeral),
        blocks: vec![Block::mrkdwn_section(format_history(history))],
        ..ResponseMessage::default()
    }
}

/// Format a user's fulfillment history: a count line, then one line per record.
#[must_use]
pub fn format_history(history: &[FulfilledSeed]) -> String {
    let noun = if history.len() == 1 { "request" } else { "requests" };
    let mut output = format!("You have fulfilled {} {noun}", history.len());

    for record in history {
        let _ = write!(
            output,
            "\n<@{}>: {} @ {}",
            record.requester,
            record.topic,
            record.fulfilled_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    output
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pear_core::SeedId;

    use super::*;

    fn seed() -> Seed {
        Seed {
            id: SeedId::new(42),
            requester: "U_REQ".to_string(),
            topic: "Rust lifetimes".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_has_two_buttons() {
        let message = build_request_prompt("learn Go");

        assert_eq!(message.response_type, Some(ResponseType::Ephemeral));
        let actions = message.blocks.iter().find_map(|block| match block {
            Block::Actions { elements, .. } => Some(elements),
            _ => None,
        });
        let elements = actions.expect("Expected Actions block");
        assert_eq!(elements.len(), 2);

        let values: Vec<_> = elements
            .iter()
            .map(|ActionElement::Button { value, .. }| value.as_deref())
            .collect();
        assert!(values.contains(&Some("learn Go")));
    }

    #[test]
    fn test_announcement_button_carries_seed_id() {
        let blocks = build_announcement(&seed());
        assert_eq!(blocks.len(), 1);

        match blocks.first() {
            Some(Block::Section {
                text,
                accessory: Some(Accessory::Button { action_id, value, .. }),
            }) => {
                assert!(text.as_str().contains("<@U_REQ>"));
                assert!(text.as_str().contains("Rust lifetimes"));
                assert_eq!(action_id, "pick-pear");
                assert_eq!(value.as_deref(), Some("42"));
            }
            other => panic!("Expected section with button, got {other:?}"),
        }
    }

    #[test]
    fn test_fulfilled_message_keeps_original_text() {
        let original = Text::mrkdwn("<@U_REQ> wants to learn Rust lifetimes. :seedling:");
        let message = build_fulfilled_message(original.clone(), "U_HELPER");

        assert!(message.replace_original);
        assert_eq!(message.blocks.len(), 2);
        assert!(matches!(
            message.blocks.first(),
            Some(Block::Section { text, accessory: None }) if *text == original
        ));
        let json = serde_json::to_string(&message).expect("serializes");
        assert!(json.contains("<@U_HELPER> fulfilled this request."));
    }

    #[test]
    fn test_notification_names_both_parties() {
        let text = build_fulfilled_notification(&seed(), "U_HELPER");
        assert!(text.contains("<@U_REQ>"));
        assert!(text.contains("<@U_HELPER>"));
        assert!(text.contains("Rust lifetimes"));
    }

    #[test]
    fn test_format_history_empty() {
        assert_eq!(format_history(&[]), "You have fulfilled 0 requests");
    }

    #[test]
    fn test_format_history_lines() {
        let fulfilled_at = Utc
            .with_ymd_and_hms(2019, 7, 12, 15, 30, 0)
            .single()
            .expect("valid date");
        let history = vec![FulfilledSeed {
            requester: "U_REQ".to_string(),
            topic: "SQL joins".to_string(),
            fulfilled_at,
        }];

        assert_eq!(
            format_history(&history),
            "You have fulfilled 1 request\n<@U_REQ>: SQL joins @ 2019-07-12 15:30 UTC"
        );
    }

    #[test]
    fn test_delete_original() {
        let message = build_delete_original();
        assert!(message.delete_original);
        assert!(message.blocks.is_empty());
    }
}
