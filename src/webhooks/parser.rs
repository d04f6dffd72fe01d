//! GitHub webhook payload parser.
//!
//! Parses raw webhook JSON payloads into typed [`PullRequestEvent`] values.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-GitHub-Event` header
//! 2. Only `pull_request` payloads are parsed
//! 3. Other event types return `Ok(None)` (ignored, not error)
//! 4. Malformed payloads return `Err` with details
//!
//! Signature verification happens before this parser is invoked.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{DeliveryId, InstallationId, PrNumber, PullRequestPayload, RepoRef, Sha};

use super::events::{PrAction, PullRequestEvent};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A required value is absent.
    #[error("missing field {0}")]
    MissingField(&'static str),
}

/// Parses a webhook payload into a typed event.
///
/// # Returns
///
/// * `Ok(Some(event))` - A `pull_request` event
/// * `Ok(None)` - Any other event type (ignored, not an error)
/// * `Err(e)` - Malformed payload or missing required fields
///
/// # Examples
///
/// ```
/// use graphql_schema_police::types::DeliveryId;
/// use graphql_schema_police::webhooks::parse_webhook;
///
/// let result = parse_webhook("push", DeliveryId::new("d-1"), b"{}");
/// assert!(matches!(result, Ok(None)));
/// ```
pub fn parse_webhook(
    event_type: &str,
    delivery_id: DeliveryId,
    payload: &[u8],
) -> Result<Option<PullRequestEvent>, ParseError> {
    match event_type {
        "pull_request" => parse_pull_request(delivery_id, payload).map(Some),
        _ => Ok(None),
    }
}

// ============================================================================
// Raw payload structures for deserialization
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: String,
    pull_request: RawPullRequest,
    repository: RawRepository,
    installation: Option<RawInstallation>,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    html_url: String,
    #[serde(default)]
    title: String,
    head: RawRef,
    base: RawRef,
}

#[derive(Debug, Deserialize)]
struct RawRef {
    sha: String,
    /// Null when the head repository (a fork) has been deleted.
    repo: Option<RawRepository>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    owner: RawOwner,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawInstallation {
    id: u64,
}

fn repo_ref(raw: RawRef, fallback: &RawRepository) -> RepoRef {
    let (owner_login, repo_name) = match raw.repo {
        Some(repo) => (repo.owner.login, repo.name),
        None => (fallback.owner.login.clone(), fallback.name.clone()),
    };
    RepoRef {
        owner_login,
        repo_name,
        sha: Sha::new(raw.sha),
    }
}

fn parse_pull_request(
    delivery_id: DeliveryId,
    payload: &[u8],
) -> Result<PullRequestEvent, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;

    let installation = raw
        .installation
        .ok_or(ParseError::MissingField("installation.id"))?;

    let pr = raw.pull_request;
    let head = repo_ref(pr.head, &raw.repository);
    let base = repo_ref(pr.base, &raw.repository);

    Ok(PullRequestEvent {
        delivery_id,
        action: PrAction::from_api_str(&raw.action),
        payload: PullRequestPayload {
            number: PrNumber(pr.number),
            url: pr.html_url,
            title: pr.title,
            head,
            base,
            installation_id: InstallationId(installation.id),
        },
    })
}
