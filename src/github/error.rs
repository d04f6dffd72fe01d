//! GitHub API error type.
//!
//! Nothing is retried, so the only distinction callers draw is HTTP 404: the
//! opt-in check reads it as "this repository has not opted in", and a missing
//! file at one side of a comparison is isolated to that file. Every other
//! failure is reported with its status code, when there is one.

use std::fmt;
use thiserror::Error;

/// A failed GitHub API call.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Creates an error without a status code or octocrab source, e.g. for a
    /// transport failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a not-found error without an octocrab source.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status_code: Some(404),
            message: message.into(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    /// Wraps an octocrab error, keeping its status code.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        Self {
            status_code: status_code(&err),
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// API errors carry the status directly. Other errors do not; for those the
/// message is searched for a `status: NNN` pattern.
fn status_code(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }
    status_code_from_message(&err.to_string())
}

fn status_code_from_message(err_str: &str) -> Option<u16> {
    let idx = err_str.find("status: ")?;
    let rest = &err_str[idx + 8..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}
