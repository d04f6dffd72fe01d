//! The GitHub operations the pipeline depends on.
//!
//! These traits are the seam between the reconciliation logic and the GitHub
//! API. The production implementation is [`crate::github::OctocrabClient`];
//! tests use an in-memory mock.
//!
//! Clients are scoped to a single repository (the repository the pull request
//! lives in), so none of the operations take repository coordinates.
//!
//! # Example (mock for testing)
//!
//! ```ignore
//! struct MockSource {
//!     files: HashMap<(String, Sha), FileContent>,
//! }
//!
//! impl SchemaSource for MockSource {
//!     async fn get_file_content(
//!         &self,
//!         path: &str,
//!         git_ref: &Sha,
//!     ) -> Result<FileContent, GitHubApiError> {
//!         self.files
//!             .get(&(path.to_string(), git_ref.clone()))
//!             .cloned()
//!             .ok_or_else(|| GitHubApiError::not_found(path))
//!     }
//!     // ...
//! }
//! ```

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::github::GitHubApiError;
use crate::types::{ChangedFile, CommentId, InstallationId, PrNumber, RepoId, Sha};

/// File content as returned by the contents API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    /// Transport encoding, normally `base64`.
    pub encoding: String,
    /// The encoded content.
    pub content: String,
}

impl FileContent {
    /// Wraps already-decoded text.
    pub fn plain(text: impl Into<String>) -> Self {
        FileContent {
            encoding: "utf-8".to_string(),
            content: text.into(),
        }
    }
}

/// A comment on a pull request's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentData {
    pub id: CommentId,
    /// The author's login. GitHub Apps comment as `<slug>[bot]`.
    pub author_login: String,
}

/// The current tips of a pull request, read at analysis time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestData {
    pub number: PrNumber,
    pub head_sha: Sha,
    /// The base branch tip right now, which may be ahead of the webhook's
    /// `base.sha`.
    pub base_sha: Sha,
}

/// Reads schema files and the set of changed files.
pub trait SchemaSource {
    /// Returns the content of `path` at `git_ref`.
    ///
    /// A missing file is an error for which
    /// [`is_not_found`](GitHubApiError::is_not_found) holds.
    fn get_file_content(
        &self,
        path: &str,
        git_ref: &Sha,
    ) -> impl Future<Output = Result<FileContent, GitHubApiError>> + Send;

    /// Returns the files changed on `head` since `base`.
    fn get_changed_files(
        &self,
        base: &Sha,
        head: &Sha,
    ) -> impl Future<Output = Result<Vec<ChangedFile>, GitHubApiError>> + Send;
}

/// Reads and writes pull request comments.
pub trait CommentStore {
    /// Returns one page (1-indexed) of the PR's comments, oldest first.
    fn list_comments(
        &self,
        pr: PrNumber,
        page: u32,
        per_page: u8,
    ) -> impl Future<Output = Result<Vec<CommentData>, GitHubApiError>> + Send;

    fn create_comment(
        &self,
        pr: PrNumber,
        body: String,
    ) -> impl Future<Output = Result<CommentId, GitHubApiError>> + Send;

    fn update_comment(
        &self,
        comment_id: CommentId,
        body: String,
    ) -> impl Future<Output = Result<(), GitHubApiError>> + Send;
}

/// Reads pull request and commit graph metadata.
pub trait PullRequestSource {
    fn get_pull_request(
        &self,
        pr: PrNumber,
    ) -> impl Future<Output = Result<PullRequestData, GitHubApiError>> + Send;

    /// Returns the common ancestor of `base` and `head`, if GitHub reports one.
    fn merge_base(
        &self,
        base: &Sha,
        head: &Sha,
    ) -> impl Future<Output = Result<Option<Sha>, GitHubApiError>> + Send;
}

/// Everything the pipeline needs from a repository-scoped client.
pub trait RepoClient: SchemaSource + CommentStore + PullRequestSource + Send + Sync {}

impl<T> RepoClient for T where T: SchemaSource + CommentStore + PullRequestSource + Send + Sync {}

/// Exchanges an installation ID for a repository-scoped client.
///
/// A fresh client is minted for every delivery; no authenticated handle is
/// shared between deliveries.
pub trait Authenticator: Send + Sync {
    type Client: RepoClient;

    fn authenticate(
        &self,
        installation: InstallationId,
        repo: RepoId,
    ) -> impl Future<Output = Result<Self::Client, GitHubApiError>> + Send;
}
