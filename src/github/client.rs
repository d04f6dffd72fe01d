//! Octocrab client wrapper scoped to a specific repository.
//!
//! `OctocrabClient` wraps an installation-authenticated `Octocrab` instance and
//! scopes all operations to the repository a delivery is about.

use octocrab::Octocrab;

use crate::types::RepoId;

/// A GitHub API client scoped to a specific repository.
#[derive(Clone)]
pub struct OctocrabClient {
    /// The underlying octocrab client.
    client: Octocrab,

    /// The repository this client is scoped to.
    repo: RepoId,
}

impl OctocrabClient {
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    /// Builds a REST route under this repository, e.g. `/repos/o/r/pulls/1`.
    pub(crate) fn route(&self, suffix: &str) -> String {
        format!(
            "/repos/{}/{}/{}",
            urlencoding::encode(self.owner()),
            urlencoding::encode(self.repo_name()),
            suffix
        )
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
