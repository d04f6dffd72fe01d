//! GitHub webhook event types.
//!
//! The bot only reacts to `pull_request` events. Everything it needs from such
//! an event is captured in [`PullRequestEvent`]; the raw body and signature stay
//! in the HTTP layer, which verifies them before an event is ever built.

use serde::{Deserialize, Serialize};

use crate::types::{DeliveryId, PullRequestPayload};

/// Action performed on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    /// PR was opened.
    Opened,
    /// PR head was updated (new commits pushed).
    Synchronize,
    /// Any other action (closed, labeled, edited, ...). Carries the raw name
    /// for logging.
    Other(String),
}

impl PrAction {
    pub fn from_api_str(action: &str) -> Self {
        match action {
            "opened" => PrAction::Opened,
            "synchronize" => PrAction::Synchronize,
            other => PrAction::Other(other.to_string()),
        }
    }

    /// Returns true if this action can change the PR's schema files.
    pub fn is_analyzable(&self) -> bool {
        matches!(self, PrAction::Opened | PrAction::Synchronize)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PrAction::Opened => "opened",
            PrAction::Synchronize => "synchronize",
            PrAction::Other(name) => name,
        }
    }
}

/// A verified `pull_request` webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    /// The `X-GitHub-Delivery` header, for log correlation.
    pub delivery_id: DeliveryId,

    /// The action that triggered this event.
    pub action: PrAction,

    pub payload: PullRequestPayload,
}
