//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA1)
//! - Parsing of `pull_request` payloads into typed events

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{PrAction, PullRequestEvent};
pub use parser::{ParseError, parse_webhook};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, verify_signature,
};
