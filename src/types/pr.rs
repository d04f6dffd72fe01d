//! Pull request and changed-file types.
//!
//! These are the request-scoped views of a pull request that the pipeline
//! works with. They are built from a webhook payload or an API response and
//! discarded once the delivery has been handled.

use serde::{Deserialize, Serialize};

use super::ids::{InstallationId, PrNumber, RepoId, Sha};

/// One side (head or base) of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    /// Login of the repository owner.
    pub owner_login: String,
    /// Repository name.
    pub repo_name: String,
    /// Commit the ref pointed at when the event was sent.
    pub sha: Sha,
}

impl RepoRef {
    pub fn repo_id(&self) -> RepoId {
        RepoId::new(&self.owner_login, &self.repo_name)
    }
}

/// The parts of a `pull_request` webhook payload the pipeline needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestPayload {
    pub number: PrNumber,
    /// The PR's web URL.
    pub url: String,
    pub title: String,
    pub head: RepoRef,
    /// The base branch. `base.sha` is the branch tip when the webhook was
    /// sent and goes stale as the branch advances; it is never used as the
    /// comparison point.
    pub base: RepoRef,
    pub installation_id: InstallationId,
}

impl PullRequestPayload {
    /// The repository the pull request (and therefore its comments) lives in.
    pub fn repo_id(&self) -> RepoId {
        self.base.repo_id()
    }
}

/// How a file changed between the merge base and the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl FileStatus {
    /// Maps a GitHub file status string.
    ///
    /// GitHub also reports `copied`, `changed` and `unchanged`; all of these
    /// leave a readable file at the same path on both sides, so they are
    /// treated as modifications.
    pub fn from_api_str(status: &str) -> Self {
        match status {
            "added" => FileStatus::Added,
            "removed" => FileStatus::Removed,
            "renamed" => FileStatus::Renamed,
            _ => FileStatus::Modified,
        }
    }
}

/// A file touched by the pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    /// Set for renamed files: the path on the base side.
    pub previous_filename: Option<String>,
    pub status: FileStatus,
    /// Number of changed lines.
    pub changes: u64,
}

impl ChangedFile {
    /// Returns true if this is a GraphQL schema file.
    ///
    /// The match is a case-insensitive suffix match on `.graphql` or `.gql`.
    pub fn is_schema_file(&self) -> bool {
        let lower = self.filename.to_ascii_lowercase();
        lower.ends_with(".graphql") || lower.ends_with(".gql")
    }

    /// The path of this file on the base side of the comparison.
    pub fn base_path(&self) -> &str {
        self.previous_filename.as_deref().unwrap_or(&self.filename)
    }

    /// A rename without edits has no content delta to analyse.
    pub fn is_pure_rename(&self) -> bool {
        self.status == FileStatus::Renamed && self.changes == 0
    }
}
