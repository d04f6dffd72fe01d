//! Shared test utilities: an in-memory GitHub and event fixtures.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use proptest::prelude::*;

use crate::api::{
    Authenticator, CommentData, CommentStore, FileContent, PullRequestData, PullRequestSource,
    SchemaSource,
};
use crate::github::GitHubApiError;
use crate::reconcile::OPT_IN_PATH;
use crate::types::{
    ChangedFile, CommentId, DeliveryId, FileStatus, InstallationId, PrNumber, PullRequestPayload,
    RepoId, RepoRef, Sha,
};
use crate::webhooks::{PrAction, PullRequestEvent};

pub const OWNER: &str = "octo";
pub const REPO: &str = "api";
pub const BOT_LOGIN: &str = "graphql-schema-police[bot]";
pub const PR: PrNumber = PrNumber(42);

pub fn arb_sha() -> impl Strategy<Value = Sha> {
    "[0-9a-f]{40}".prop_map(Sha::new)
}

/// The fresh PR head the mock reports.
pub fn head_sha() -> Sha {
    Sha::new("h".repeat(40))
}

/// The fresh base branch tip the mock reports.
pub fn base_tip_sha() -> Sha {
    Sha::new("b".repeat(40))
}

/// The merge base the mock reports.
pub fn merge_base_sha() -> Sha {
    Sha::new("m".repeat(40))
}

/// Encodes SDL the way the contents API returns it.
pub fn encoded(text: &str) -> FileContent {
    FileContent {
        encoding: "base64".to_string(),
        content: STANDARD.encode(text),
    }
}

pub fn modified(path: &str) -> ChangedFile {
    ChangedFile {
        filename: path.to_string(),
        previous_filename: None,
        status: FileStatus::Modified,
        changes: 2,
    }
}

pub fn renamed(from: &str, to: &str, changes: u64) -> ChangedFile {
    ChangedFile {
        filename: to.to_string(),
        previous_filename: Some(from.to_string()),
        status: FileStatus::Renamed,
        changes,
    }
}

pub fn payload() -> PullRequestPayload {
    let side = |sha: &str| RepoRef {
        owner_login: OWNER.to_string(),
        repo_name: REPO.to_string(),
        sha: Sha::new(sha),
    };
    PullRequestPayload {
        number: PR,
        url: format!("https://github.com/{}/{}/pull/{}", OWNER, REPO, PR.0),
        title: "Change the schema".to_string(),
        // Stale on purpose: the pipeline must use the fresh values.
        head: side("stale-head"),
        base: side("stale-base"),
        installation_id: InstallationId(7),
    }
}

pub fn event(action: &str) -> PullRequestEvent {
    PullRequestEvent {
        delivery_id: DeliveryId::new("delivery-1"),
        action: PrAction::from_api_str(action),
        payload: payload(),
    }
}

// ─── MockGitHub ───────────────────────────────────────────────────────────────

/// A GitHub API call made against [`MockGitHub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetFileContent { path: String, git_ref: Sha },
    GetChangedFiles { base: Sha, head: Sha },
    GetPullRequest(PrNumber),
    MergeBase { base: Sha, head: Sha },
    ListComments { page: u32, per_page: u8 },
    CreateComment { pr: PrNumber, body: String },
    UpdateComment { id: CommentId, body: String },
}

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<(String, Sha), FileContent>,
    failing_paths: HashSet<String>,
    changed_files: Vec<ChangedFile>,
    comments: Vec<CommentData>,
    pull_request: Option<PullRequestData>,
    merge_base: Option<Sha>,
    next_comment_id: u64,
    calls: Vec<Call>,
}

/// An in-memory GitHub repository.
///
/// Clones share state, so a test can hand one clone to the pipeline and
/// inspect the recorded calls through another.
#[derive(Debug, Clone, Default)]
pub struct MockGitHub {
    state: Arc<Mutex<MockState>>,
}

impl MockGitHub {
    /// A repository with an open PR, a resolvable merge base and the opt-in
    /// file present.
    pub fn opted_in() -> Self {
        let mock = Self::default();
        {
            let mut state = mock.lock();
            state.pull_request = Some(PullRequestData {
                number: PR,
                head_sha: head_sha(),
                base_sha: base_tip_sha(),
            });
            state.merge_base = Some(merge_base_sha());
            state.next_comment_id = 1000;
        }
        mock.with_file(OPT_IN_PATH, &merge_base_sha(), "")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn with_file(self, path: &str, git_ref: &Sha, text: &str) -> Self {
        self.lock()
            .files
            .insert((path.to_string(), git_ref.clone()), encoded(text));
        self
    }

    /// Stores `old` at the merge base and `new` at the head.
    pub fn with_schema_change(self, path: &str, old: &str, new: &str) -> Self {
        self.with_file(path, &merge_base_sha(), old)
            .with_file(path, &head_sha(), new)
            .with_changed_file(modified(path))
    }

    pub fn with_changed_file(self, file: ChangedFile) -> Self {
        self.lock().changed_files.push(file);
        self
    }

    /// Fetching `path` fails with a transient error.
    pub fn with_failing_path(self, path: &str) -> Self {
        self.lock().failing_paths.insert(path.to_string());
        self
    }

    pub fn with_comment(self, id: u64, author_login: &str) -> Self {
        self.lock().comments.push(CommentData {
            id: CommentId(id),
            author_login: author_login.to_string(),
        });
        self
    }

    pub fn without_opt_in(self) -> Self {
        self.lock()
            .files
            .remove(&(OPT_IN_PATH.to_string(), merge_base_sha()));
        self
    }

    pub fn with_merge_base(self, sha: Sha) -> Self {
        self.lock().merge_base = Some(sha);
        self
    }

    pub fn without_merge_base(self) -> Self {
        self.lock().merge_base = None;
        self
    }

    pub fn without_pull_request(self) -> Self {
        self.lock().pull_request = None;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn created_comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateComment { body, .. } => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn updated_comments(&self) -> Vec<(CommentId, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::UpdateComment { id, body } => Some((id, body)),
                _ => None,
            })
            .collect()
    }

    pub fn list_comment_pages(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::ListComments { page, .. } => Some(page),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }
}

impl SchemaSource for MockGitHub {
    async fn get_file_content(
        &self,
        path: &str,
        git_ref: &Sha,
    ) -> Result<FileContent, GitHubApiError> {
        self.record(Call::GetFileContent {
            path: path.to_string(),
            git_ref: git_ref.clone(),
        });
        let state = self.lock();
        if state.failing_paths.contains(path) {
            return Err(GitHubApiError::new("connection reset"));
        }
        state
            .files
            .get(&(path.to_string(), git_ref.clone()))
            .cloned()
            .ok_or_else(|| GitHubApiError::not_found(format!("{} at {}", path, git_ref)))
    }

    async fn get_changed_files(
        &self,
        base: &Sha,
        head: &Sha,
    ) -> Result<Vec<ChangedFile>, GitHubApiError> {
        self.record(Call::GetChangedFiles {
            base: base.clone(),
            head: head.clone(),
        });
        Ok(self.lock().changed_files.clone())
    }
}

impl PullRequestSource for MockGitHub {
    async fn get_pull_request(&self, pr: PrNumber) -> Result<PullRequestData, GitHubApiError> {
        self.record(Call::GetPullRequest(pr));
        self.lock()
            .pull_request
            .clone()
            .ok_or_else(|| GitHubApiError::not_found(format!("pull request {}", pr)))
    }

    async fn merge_base(&self, base: &Sha, head: &Sha) -> Result<Option<Sha>, GitHubApiError> {
        self.record(Call::MergeBase {
            base: base.clone(),
            head: head.clone(),
        });
        Ok(self.lock().merge_base.clone())
    }
}

impl CommentStore for MockGitHub {
    async fn list_comments(
        &self,
        _pr: PrNumber,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<CommentData>, GitHubApiError> {
        self.record(Call::ListComments { page, per_page });
        let state = self.lock();
        let start = (page as usize - 1) * per_page as usize;
        Ok(state
            .comments
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn create_comment(
        &self,
        pr: PrNumber,
        body: String,
    ) -> Result<CommentId, GitHubApiError> {
        self.record(Call::CreateComment { pr, body });
        let mut state = self.lock();
        state.next_comment_id += 1;
        let id = CommentId(state.next_comment_id);
        state.comments.push(CommentData {
            id,
            author_login: BOT_LOGIN.to_string(),
        });
        Ok(id)
    }

    async fn update_comment(&self, id: CommentId, body: String) -> Result<(), GitHubApiError> {
        self.record(Call::UpdateComment { id, body });
        Ok(())
    }
}

// ─── MockAuthenticator ────────────────────────────────────────────────────────

/// Hands out clones of one [`MockGitHub`] and counts authentications.
#[derive(Debug, Clone, Default)]
pub struct MockAuthenticator {
    pub github: MockGitHub,
    authentications: Arc<AtomicUsize>,
    fail: bool,
    delay: Option<Duration>,
}

impl MockAuthenticator {
    pub fn new(github: MockGitHub) -> Self {
        Self {
            github,
            authentications: Arc::default(),
            fail: false,
            delay: None,
        }
    }

    /// Every token exchange takes `delay` before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every token exchange fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn authentications(&self) -> usize {
        self.authentications.load(Ordering::SeqCst)
    }
}

impl Authenticator for MockAuthenticator {
    type Client = MockGitHub;

    async fn authenticate(
        &self,
        _installation: InstallationId,
        _repo: RepoId,
    ) -> Result<MockGitHub, GitHubApiError> {
        self.authentications.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(GitHubApiError::new("bad credentials"));
        }
        Ok(self.github.clone())
    }
}
