//! Per-file analysis.
//!
//! Each changed schema file is fetched at both ends of the comparison and run
//! through the schema engine. Failures stay with the file they happened to:
//! one unreadable file never hides the results for the others.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::api::SchemaSource;
use crate::github::GitHubApiError;
use crate::report::blob_url;
use crate::schema::{self, SchemaFileResult};
use crate::types::{ChangedFile, FileStatus, RepoId};

use super::merge_base::ResolvedBase;

/// A repository opts in by committing this file.
pub const OPT_IN_PATH: &str = ".github/graphql-schema-police.yml";

/// Why a changed schema file was not analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Renamed without edits.
    PureRename,
    /// New file: there is no earlier version to break.
    Added,
    /// Deleted file: there is nothing to compare against.
    Removed,
}

/// What happened to one changed schema file.
#[derive(Debug)]
pub enum FileOutcome {
    Analyzed(SchemaFileResult),
    Skipped {
        file: String,
        reason: SkipReason,
    },
    FetchFailed {
        file: String,
        error: GitHubApiError,
    },
}

impl FileOutcome {
    pub fn into_result(self) -> Option<SchemaFileResult> {
        match self {
            FileOutcome::Analyzed(result) => Some(result),
            FileOutcome::Skipped { .. } | FileOutcome::FetchFailed { .. } => None,
        }
    }
}

/// Decides whether a file can be analysed at all.
fn skip_reason(file: &ChangedFile) -> Option<SkipReason> {
    if file.is_pure_rename() {
        return Some(SkipReason::PureRename);
    }
    match file.status {
        FileStatus::Added => Some(SkipReason::Added),
        FileStatus::Removed => Some(SkipReason::Removed),
        FileStatus::Modified | FileStatus::Renamed => None,
    }
}

/// Analyses one changed file.
///
/// The old content is read at the merge base (from the pre-rename path for
/// renamed files), the new content at the head.
pub async fn analyze_file<C: SchemaSource>(
    client: &C,
    file: &ChangedFile,
    base: &ResolvedBase,
    repo: &RepoId,
    web_url: &str,
) -> FileOutcome {
    if let Some(reason) = skip_reason(file) {
        debug!(file = %file.filename, reason = ?reason, "Skipping schema file");
        return FileOutcome::Skipped {
            file: file.filename.clone(),
            reason,
        };
    }

    let old = match client.get_file_content(file.base_path(), &base.merge_base).await {
        Ok(content) => content,
        Err(error) => return fetch_failed(file, error),
    };
    let new = match client.get_file_content(&file.filename, &base.head).await {
        Ok(content) => content,
        Err(error) => return fetch_failed(file, error),
    };

    FileOutcome::Analyzed(SchemaFileResult {
        file: file.filename.clone(),
        content_url: blob_url(web_url, repo, &base.head, &file.filename),
        verdict: schema::compare(&old, &new),
    })
}

fn fetch_failed(file: &ChangedFile, error: GitHubApiError) -> FileOutcome {
    warn!(file = %file.filename, error = %error, "Failed to fetch schema file");
    FileOutcome::FetchFailed {
        file: file.filename.clone(),
        error,
    }
}

/// Analyses files concurrently. Outcomes are in the same order as `files`.
pub async fn analyze_files<C: SchemaSource>(
    client: &C,
    files: &[ChangedFile],
    base: &ResolvedBase,
    repo: &RepoId,
    web_url: &str,
) -> Vec<FileOutcome> {
    join_all(
        files
            .iter()
            .map(|file| analyze_file(client, file, base, repo, web_url)),
    )
    .await
}
