//! Merge-base resolution.
//!
//! The base side of a comparison is the common ancestor of the PR's head and
//! its base branch, computed from the PR as it is now. The `base.sha` in the
//! webhook is the base branch tip at send time; comparing against it would
//! attribute every change merged to the base branch since the PR branched to
//! the PR itself.

use tracing::{debug, warn};

use crate::api::PullRequestSource;
use crate::types::{PrNumber, Sha};

/// The two commits a delivery compares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBase {
    pub merge_base: Sha,
    /// The PR head the merge base was computed against.
    pub head: Sha,
}

/// Resolves the merge base of a pull request.
///
/// Returns `None` if the pull request cannot be fetched, or GitHub reports no
/// merge base for it. Both are logged here; callers just stop.
pub async fn resolve_base<C: PullRequestSource>(client: &C, pr: PrNumber) -> Option<ResolvedBase> {
    let pull = match client.get_pull_request(pr).await {
        Ok(pull) => pull,
        Err(e) => {
            warn!(pr = %pr, error = %e, "Failed to fetch pull request");
            return None;
        }
    };

    match client.merge_base(&pull.base_sha, &pull.head_sha).await {
        Ok(Some(merge_base)) => {
            debug!(
                pr = %pr,
                merge_base = %merge_base.short(),
                head = %pull.head_sha.short(),
                "Resolved merge base"
            );
            Some(ResolvedBase {
                merge_base,
                head: pull.head_sha,
            })
        }
        Ok(None) => {
            warn!(pr = %pr, "GitHub reported no merge base");
            None
        }
        Err(e) => {
            warn!(pr = %pr, error = %e, "Failed to compute merge base");
            None
        }
    }
}
