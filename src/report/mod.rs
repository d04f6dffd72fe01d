//! Rendering analysis results as a pull request comment.

pub mod classify;
pub mod format;

pub use classify::{FALLBACK_TITLE, render};
pub use format::{
    GITHUB_COMMENT_SIZE_LIMIT, NO_BREAKING_CHANGES_MESSAGE, blob_url, format_report,
};
