//! Slack integration for the seed/pear flow.
//!
//! This module provides:
//! - [`SlackClient`] for posting messages and opening conversations
//! - [`ChatApi`], the outbound seam the service depends on
//! - Block Kit types for building rich messages
//! - Inbound slash command and interaction payloads
//! - Message builders for each step of the flow
//! - Webhook signature verification
//!
//! # Flow
//!
//! 1. A user runs `/pear <topic>` and gets an ephemeral confirm/cancel prompt
//! 2. Confirming records a seed and announces it in the configured channel
//! 3. Another user clicks the announcement's button to pick the pear
//! 4. The announcement is updated and the requester gets a direct message

mod client;
mod error;
mod messages;
mod types;
mod verify;

pub use client::{ChatApi, SLACK_API_BASE, SlackClient};
pub use error::SlackError;
pub use messages::{
    announcement_text, build_announcement, build_delete_original, build_fulfilled_message,
    build_fulfilled_notification, build_history_message, build_request_prompt,
    build_request_recorded, format_history,
};
pub use types::{
    Accessory, ActionElement, Block, ButtonStyle, ContextElement, InteractionAction,
    InteractionMessage, InteractionPayload, InteractionUser, MessageBlock,
    PlainText, PostMessageResponse, ResponseMessage, ResponseType, SlashCommand, Text,
};
pub use verify::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER, unix_now};
