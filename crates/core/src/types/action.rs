//! Interaction action kinds.
//!
//! Every interactive button Pear renders carries one of these identifiers as
//! its `action_id`. Incoming block actions are mapped back through
//! [`ActionKind::from_action_id`]; identifiers Pear never issued map to
//! [`ActionKind::Unknown`].

use serde::{Deserialize, Serialize};

/// The block ID of the confirm/cancel prompt's actions block.
pub const SEED_BLOCK_ID: &str = "seed-block";

/// Kind of button a user clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Confirm a new learning request. Button value is the topic.
    ConfirmRequest,
    /// Dismiss the confirmation prompt.
    CancelRequest,
    /// Offer to help with a posted request. Button value is the seed ID.
    FulfillRequest,
    /// Any identifier not issued by Pear.
    Unknown,
}

impl ActionKind {
    /// Wire identifier used as the button's `action_id`.
    #[must_use]
    pub const fn action_id(self) -> &'static str {
        match self {
            Self::ConfirmRequest => "submit-seed",
            Self::CancelRequest => "cancel-seed",
            Self::FulfillRequest => "pick-pear",
            Self::Unknown => "unknown",
        }
    }

    /// Map an incoming `action_id` back to its kind.
    #[must_use]
    pub fn from_action_id(action_id: &str) -> Self {
        match action_id {
            "submit-seed" => Self::ConfirmRequest,
            "cancel-seed" => Self::CancelRequest,
            "pick-pear" => Self::FulfillRequest,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.action_id())
    }
}
