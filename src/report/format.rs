//! Pull request comment formatting.
//!
//! The comment has one block per analysed file that has something to say, in
//! the order the files were analysed. Clean files contribute nothing, so a
//! run where every file is clean renders an empty body; the caller decides
//! whether that means "say nothing" or "replace the old comment with
//! [`NO_BREAKING_CHANGES_MESSAGE`]".

use crate::github::encode_path;
use crate::schema::{SchemaFileResult, Verdict};
use crate::types::{RepoId, Sha};

use super::classify;

/// GitHub's comment size limit (65536 characters).
pub const GITHUB_COMMENT_SIZE_LIMIT: usize = 65536;

/// Body used when an existing comment has nothing left to report.
pub const NO_BREAKING_CHANGES_MESSAGE: &str =
    ":white_check_mark: No breaking changes found in GraphQL schema files.";

/// Marker for files with breaking changes.
const BREAKING_MARKER: &str = ":no_entry:";

/// Marker for files that could not be parsed.
const PARSE_FAILURE_MARKER: &str = ":warning:";

/// Marker for files that could not be read or compared.
const COMPARE_FAILURE_MARKER: &str = ":x:";

/// Builds the web URL of a file at a commit.
///
/// ```
/// use graphql_schema_police::report::blob_url;
/// use graphql_schema_police::types::{RepoId, Sha};
///
/// let url = blob_url(
///     "https://github.com",
///     &RepoId::new("octo", "api"),
///     &Sha::new("abc123"),
///     "schema/api.graphql",
/// );
/// assert_eq!(url, "https://github.com/octo/api/blob/abc123/schema/api.graphql");
/// ```
pub fn blob_url(web_url: &str, repo: &RepoId, head: &Sha, path: &str) -> String {
    format!(
        "{}/{}/{}/blob/{}/{}",
        web_url.trim_end_matches('/'),
        repo.owner,
        repo.repo,
        head,
        encode_path(path)
    )
}

/// Formats the comment body for a set of file results.
///
/// Returns an empty string when every file is clean.
pub fn format_report(results: &[SchemaFileResult]) -> String {
    let blocks: Vec<String> = results.iter().filter_map(format_file_block).collect();
    truncate_with_suffix(&blocks.join("\n\n"), GITHUB_COMMENT_SIZE_LIMIT)
}

fn format_file_block(result: &SchemaFileResult) -> Option<String> {
    if result.verdict.is_clean() {
        return None;
    }

    // The URL is percent-encoded by `blob_url`; only the label needs care.
    let link = format!("[{}]({})", inline_code(&result.file), result.content_url);

    match &result.verdict {
        Verdict::CompareFailure(message) => Some(format!(
            "### {} Could not compare {}\n\n{}",
            COMPARE_FAILURE_MARKER,
            link,
            code_block(message)
        )),
        Verdict::ParseFailure(message) => Some(format!(
            "### {} Syntax error in {}\n\n{}",
            PARSE_FAILURE_MARKER,
            link,
            code_block(message)
        )),
        Verdict::Success(changes) => Some(format!(
            "### {} Breaking changes in {}\n\n{}",
            BREAKING_MARKER,
            link,
            classify::render(changes).join("\n")
        )),
    }
}

/// Returns a run of backticks longer than any run inside `text`, and at least
/// `min` long, so `text` cannot close the code span or block early.
fn backtick_fence(text: &str, min: usize) -> String {
    let longest = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(min.max(longest + 1))
}

fn inline_code(text: &str) -> String {
    let fence = backtick_fence(text, 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{} {} {}", fence, text, fence)
    } else {
        format!("{}{}{}", fence, text, fence)
    }
}

fn code_block(text: &str) -> String {
    let fence = backtick_fence(text, 3);
    format!("{}\n{}\n{}", fence, text, fence)
}

/// Truncates a string to the given length with a "... [truncated]" suffix.
fn truncate_with_suffix(s: &str, max_len: usize) -> String {
    const SUFFIX: &str = "\n\n... [truncated]";

    if s.len() <= max_len {
        return s.to_string();
    }

    let content_len = max_len.saturating_sub(SUFFIX.len());

    // Find a valid UTF-8 boundary
    let mut end = content_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &s[..end], SUFFIX)
}
