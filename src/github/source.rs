//! The pipeline's GitHub operations, implemented with octocrab.
//!
//! Every call is a single attempt: failures are categorised and returned, never
//! retried.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{
    CommentData, CommentStore, FileContent, PullRequestData, PullRequestSource, SchemaSource,
};
use crate::types::{ChangedFile, CommentId, FileStatus, PrNumber, Sha};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

// ─── Raw response types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawContent {
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawComparison {
    merge_base_commit: Option<RawCommitRef>,
    #[serde(default)]
    files: Vec<RawChangedFile>,
}

#[derive(Debug, Deserialize)]
struct RawCommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RawChangedFile {
    filename: String,
    previous_filename: Option<String>,
    status: String,
    #[serde(default)]
    changes: u64,
}

impl From<RawChangedFile> for ChangedFile {
    fn from(raw: RawChangedFile) -> Self {
        ChangedFile {
            status: FileStatus::from_api_str(&raw.status),
            filename: raw.filename,
            previous_filename: raw.previous_filename,
            changes: raw.changes,
        }
    }
}

/// Percent-encodes each segment of a repository path, keeping the slashes.
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Files requested per page of a comparison.
const COMPARE_FILES_PER_PAGE: u8 = 100;

/// GitHub lists at most this many files for one comparison.
const COMPARE_MAX_FILES: usize = 3000;

/// Whether to fetch another page of comparison files.
#[derive(Debug, PartialEq, Eq)]
enum ComparePaging {
    More,
    Done,
    /// GitHub's file cap was reached; any further files are not listed.
    Capped,
}

fn compare_paging(received: usize, collected: usize) -> ComparePaging {
    if received < usize::from(COMPARE_FILES_PER_PAGE) {
        ComparePaging::Done
    } else if collected >= COMPARE_MAX_FILES {
        ComparePaging::Capped
    } else {
        ComparePaging::More
    }
}

impl OctocrabClient {
    async fn compare(
        &self,
        base: &Sha,
        head: &Sha,
        page: u32,
    ) -> Result<RawComparison, GitHubApiError> {
        #[derive(Serialize)]
        struct PageQuery {
            page: u32,
            per_page: u8,
        }

        let route = self.route(&format!(
            "compare/{}...{}",
            urlencoding::encode(base.as_str()),
            urlencoding::encode(head.as_str())
        ));
        let query = PageQuery {
            page,
            per_page: COMPARE_FILES_PER_PAGE,
        };

        self.inner()
            .get(&route, Some(&query))
            .await
            .map_err(GitHubApiError::from_octocrab)
    }
}

// ─── Schema files ─────────────────────────────────────────────────────────────

impl SchemaSource for OctocrabClient {
    async fn get_file_content(
        &self,
        path: &str,
        git_ref: &Sha,
    ) -> Result<FileContent, GitHubApiError> {
        #[derive(Serialize)]
        struct ContentQuery<'a> {
            #[serde(rename = "ref")]
            git_ref: &'a str,
        }

        let route = self.route(&format!("contents/{}", encode_path(path)));
        let query = ContentQuery {
            git_ref: git_ref.as_str(),
        };

        let raw: RawContent = self
            .inner()
            .get(&route, Some(&query))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(FileContent {
            encoding: raw.encoding.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
        })
    }

    async fn get_changed_files(
        &self,
        base: &Sha,
        head: &Sha,
    ) -> Result<Vec<ChangedFile>, GitHubApiError> {
        let mut files = Vec::new();
        let mut page = 1;

        loop {
            let comparison = self.compare(base, head, page).await?;
            let received = comparison.files.len();
            files.extend(comparison.files.into_iter().map(ChangedFile::from));

            match compare_paging(received, files.len()) {
                ComparePaging::More => page += 1,
                ComparePaging::Done => break,
                ComparePaging::Capped => {
                    warn!(
                        base = %base,
                        head = %head,
                        files = files.len(),
                        "Comparison file list is capped; later files are not analysed"
                    );
                    break;
                }
            }
        }

        Ok(files)
    }
}

// ─── Pull requests ────────────────────────────────────────────────────────────

impl PullRequestSource for OctocrabClient {
    async fn get_pull_request(&self, pr: PrNumber) -> Result<PullRequestData, GitHubApiError> {
        let pull = self
            .inner()
            .pulls(self.owner(), self.repo_name())
            .get(pr.0)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(PullRequestData {
            number: pr,
            head_sha: Sha::new(pull.head.sha),
            base_sha: Sha::new(pull.base.sha),
        })
    }

    async fn merge_base(&self, base: &Sha, head: &Sha) -> Result<Option<Sha>, GitHubApiError> {
        let comparison = self.compare(base, head, 1).await?;
        Ok(comparison.merge_base_commit.map(|c| Sha::new(c.sha)))
    }
}

// ─── Comments ─────────────────────────────────────────────────────────────────

impl CommentStore for OctocrabClient {
    async fn list_comments(
        &self,
        pr: PrNumber,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<CommentData>, GitHubApiError> {
        let page_result = self
            .inner()
            .issues(self.owner(), self.repo_name())
            .list_comments(pr.0)
            .per_page(per_page)
            .page(page)
            .send()
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(page_result
            .items
            .into_iter()
            .map(|comment| CommentData {
                id: CommentId(comment.id.into_inner()),
                author_login: comment.user.login,
            })
            .collect())
    }

    async fn create_comment(
        &self,
        pr: PrNumber,
        body: String,
    ) -> Result<CommentId, GitHubApiError> {
        let comment = self
            .inner()
            .issues(self.owner(), self.repo_name())
            .create_comment(pr.0, body)
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(CommentId(comment.id.into_inner()))
    }

    async fn update_comment(
        &self,
        comment_id: CommentId,
        body: String,
    ) -> Result<(), GitHubApiError> {
        #[derive(Serialize)]
        struct UpdateRequest {
            body: String,
        }

        let route = self.route(&format!("issues/comments/{}", comment_id.0));

        let _: serde_json::Value = self
            .inner()
            .patch(&route, Some(&UpdateRequest { body }))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(())
    }
}
