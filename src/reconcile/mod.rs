//! The per-delivery reconciliation pipeline.
//!
//! One `pull_request` delivery is driven from the verified event to at most one
//! comment write:
//!
//! ```text
//! Received → Verified → Gated → FilesDiscovered → PerFileAnalyzed
//!          → CommentAssembled → Reconciled
//! ```
//!
//! Every stage can end the delivery early with [`Outcome::Terminated`]. Those
//! are normal, silent endings; [`ReconcileError`] is reserved for GitHub
//! failures that leave the pipeline unable to decide, and for timeouts.

use std::time::Duration;

use thiserror::Error;

use crate::github::GitHubApiError;
use crate::types::CommentId;

pub mod comments;
pub mod controller;
pub mod files;
pub mod merge_base;


pub use comments::{COMMENTS_PER_PAGE, find_bot_comment};
pub use controller::{
    CommentAction, CommentVerdict, decide_comment, process_delivery, reconcile_pull_request,
};
pub use files::{FileOutcome, OPT_IN_PATH, SkipReason, analyze_file, analyze_files};
pub use merge_base::{ResolvedBase, resolve_base};

/// Default login the bot's comments are authored by.
pub const DEFAULT_BOT_LOGIN: &str = "graphql-schema-police[bot]";

/// Default GitHub web URL used for file links.
pub const DEFAULT_WEB_URL: &str = "https://github.com";

/// Per-process settings for the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Login that identifies the bot's own comment.
    pub bot_login: String,

    /// Base of the file links in the report.
    pub web_url: String,

    /// Upper bound on comment pages scanned for the bot's comment.
    pub max_comment_pages: u32,

    /// Wall-clock budget for one delivery.
    pub delivery_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            bot_login: DEFAULT_BOT_LOGIN.to_string(),
            web_url: DEFAULT_WEB_URL.to_string(),
            max_comment_pages: 20,
            delivery_timeout: Duration::from_secs(60),
        }
    }
}

/// How a delivery ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was written.
    Terminated(Termination),
    /// The bot comment was written.
    Reconciled(Reconciled),
}

/// Why a delivery ended without writing a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The action cannot change schema files (closed, labeled, ...).
    UnsupportedAction(String),
    /// The pull request could not be fetched or has no merge base.
    MergeBaseUnresolved,
    /// The repository has no opt-in file at the merge base.
    NotOptedIn,
    /// No changed file is a schema file.
    NoSchemaFiles,
    /// Everything is clean and there is no earlier comment to update.
    NothingToReport,
}

/// The comment write that ended a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    Created(CommentId),
    Updated(CommentId),
}

/// Failures that abort a delivery.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to authenticate as installation: {0}")]
    Authentication(#[source] GitHubApiError),

    #[error("failed to check for opt-in file: {0}")]
    OptInCheck(#[source] GitHubApiError),

    #[error("failed to list changed files: {0}")]
    ChangedFiles(#[source] GitHubApiError),

    #[error("failed to list comments: {0}")]
    CommentLookup(#[source] GitHubApiError),

    /// Every scanned page was full and none held the bot's comment. Creating a
    /// comment now could duplicate one on a later page.
    #[error("bot comment not found within the first {0} pages of comments")]
    CommentPageLimit(u32),

    #[error("failed to write comment: {0}")]
    CommentWrite(#[source] GitHubApiError),

    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}
