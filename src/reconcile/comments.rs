//! Finding the bot's existing comment.

use tracing::{debug, warn};

use crate::api::CommentStore;
use crate::types::{CommentId, PrNumber};

use super::ReconcileError;

/// Comments requested per page.
pub const COMMENTS_PER_PAGE: u8 = 50;

/// Scans the PR's comments for one authored by `bot_login`.
///
/// Pages are read in order until the comment is found or a short page marks
/// the end of the list. At most `max_pages` pages are read; if all of them are
/// full and none holds the comment, the scan fails rather than report "no
/// comment", which would lead to a duplicate being created.
pub async fn find_bot_comment<C: CommentStore>(
    client: &C,
    pr: PrNumber,
    bot_login: &str,
    max_pages: u32,
) -> Result<Option<CommentId>, ReconcileError> {
    for page in 1..=max_pages {
        let comments = client
            .list_comments(pr, page, COMMENTS_PER_PAGE)
            .await
            .map_err(ReconcileError::CommentLookup)?;

        if let Some(comment) = comments.iter().find(|c| c.author_login == bot_login) {
            debug!(pr = %pr, comment_id = %comment.id, page, "Found existing bot comment");
            return Ok(Some(comment.id));
        }

        if comments.len() < usize::from(COMMENTS_PER_PAGE) {
            return Ok(None);
        }
    }

    warn!(pr = %pr, max_pages, "Comment page limit reached without finding bot comment");
    Err(ReconcileError::CommentPageLimit(max_pages))
}
