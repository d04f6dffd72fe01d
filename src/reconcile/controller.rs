//! The reconciliation state machine.
//!
//! [`process_delivery`] is the entry point for a verified event. It rejects
//! actions that cannot change schema files before any API call, then
//! authenticates and runs [`reconcile_pull_request`] under the delivery
//! timeout. The comment decision itself, [`decide_comment`], is a pure
//! function of the bot's existing comment and the file results.

use tracing::{Instrument, debug, error, info, info_span};

use crate::api::{Authenticator, RepoClient};
use crate::report::{NO_BREAKING_CHANGES_MESSAGE, format_report};
use crate::schema::SchemaFileResult;
use crate::types::{ChangedFile, CommentId, PullRequestPayload};
use crate::webhooks::PullRequestEvent;

use super::comments::find_bot_comment;
use super::files::{FileOutcome, OPT_IN_PATH, analyze_files};
use super::merge_base::resolve_base;
use super::{Outcome, PipelineSettings, ReconcileError, Reconciled, Termination};

/// Which write ends the delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    Create,
    Update(CommentId),
}

/// The comment a delivery will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentVerdict {
    pub body: String,
    pub action: CommentAction,
}

/// Decides what to write, if anything.
///
/// Without an existing comment, a clean result writes nothing. With one, the
/// comment is always updated; a clean result replaces it with
/// [`NO_BREAKING_CHANGES_MESSAGE`] so it never goes stale or blank.
pub fn decide_comment(
    existing: Option<CommentId>,
    results: &[SchemaFileResult],
) -> Option<CommentVerdict> {
    let body = format_report(results);

    match existing {
        None if body.is_empty() => None,
        None => Some(CommentVerdict {
            body,
            action: CommentAction::Create,
        }),
        Some(id) => Some(CommentVerdict {
            body: if body.is_empty() {
                NO_BREAKING_CHANGES_MESSAGE.to_string()
            } else {
                body
            },
            action: CommentAction::Update(id),
        }),
    }
}

/// Handles one verified `pull_request` delivery.
///
/// The whole pipeline, authentication included, runs under
/// `settings.delivery_timeout`. On expiry the in-flight work is dropped and
/// nothing further is written.
pub async fn process_delivery<A: Authenticator>(
    authenticator: &A,
    settings: &PipelineSettings,
    event: PullRequestEvent,
) -> Result<Outcome, ReconcileError> {
    let payload = &event.payload;

    if !event.action.is_analyzable() {
        debug!(
            delivery_id = %event.delivery_id,
            action = %event.action.as_str(),
            "Ignoring pull request action"
        );
        return Ok(Outcome::Terminated(Termination::UnsupportedAction(
            event.action.as_str().to_string(),
        )));
    }

    let span = info_span!(
        "delivery",
        delivery_id = %event.delivery_id,
        repo = %payload.repo_id(),
        pr = %payload.number,
        base_sha = tracing::field::Empty,
    );

    let pipeline = async {
        let client = authenticator
            .authenticate(payload.installation_id, payload.repo_id())
            .await
            .map_err(ReconcileError::Authentication)?;
        reconcile_pull_request(&client, settings, payload).await
    };

    let result = tokio::time::timeout(settings.delivery_timeout, pipeline.instrument(span.clone()))
        .await
        .unwrap_or_else(|_| Err(ReconcileError::Timeout(settings.delivery_timeout)));

    span.in_scope(|| match &result {
        Ok(outcome) => info!(outcome = ?outcome, "Delivery handled"),
        Err(e) => error!(error = %e, "Delivery failed"),
    });

    result
}

/// Runs the pipeline for one pull request with an authenticated client.
pub async fn reconcile_pull_request<C: RepoClient>(
    client: &C,
    settings: &PipelineSettings,
    payload: &PullRequestPayload,
) -> Result<Outcome, ReconcileError> {
    let pr = payload.number;
    let repo = payload.repo_id();

    // Gated
    let Some(base) = resolve_base(client, pr).await else {
        return Ok(Outcome::Terminated(Termination::MergeBaseUnresolved));
    };
    tracing::Span::current().record("base_sha", tracing::field::display(&base.merge_base));

    match client.get_file_content(OPT_IN_PATH, &base.merge_base).await {
        Ok(_) => {}
        Err(e) if e.is_not_found() => {
            debug!(pr = %pr, "Repository has not opted in");
            return Ok(Outcome::Terminated(Termination::NotOptedIn));
        }
        Err(e) => return Err(ReconcileError::OptInCheck(e)),
    }

    // FilesDiscovered
    let changed = client
        .get_changed_files(&base.merge_base, &base.head)
        .await
        .map_err(ReconcileError::ChangedFiles)?;
    let schema_files: Vec<ChangedFile> = changed
        .into_iter()
        .filter(|f| f.is_schema_file())
        .collect();
    if schema_files.is_empty() {
        debug!(pr = %pr, "No schema files changed");
        return Ok(Outcome::Terminated(Termination::NoSchemaFiles));
    }

    // PerFileAnalyzed
    let outcomes = analyze_files(client, &schema_files, &base, &repo, &settings.web_url).await;
    let results: Vec<SchemaFileResult> = outcomes
        .into_iter()
        .filter_map(FileOutcome::into_result)
        .collect();
    debug!(
        pr = %pr,
        schema_files = schema_files.len(),
        analyzed = results.len(),
        "Analysed schema files"
    );

    // CommentAssembled
    let existing =
        find_bot_comment(client, pr, &settings.bot_login, settings.max_comment_pages).await?;
    let Some(verdict) = decide_comment(existing, &results) else {
        return Ok(Outcome::Terminated(Termination::NothingToReport));
    };

    // Reconciled
    match verdict.action {
        CommentAction::Create => {
            let id = client
                .create_comment(pr, verdict.body)
                .await
                .map_err(ReconcileError::CommentWrite)?;
            info!(pr = %pr, comment_id = %id, "Created schema report comment");
            Ok(Outcome::Reconciled(Reconciled::Created(id)))
        }
        CommentAction::Update(id) => {
            client
                .update_comment(id, verdict.body)
                .await
                .map_err(ReconcileError::CommentWrite)?;
            info!(pr = %pr, comment_id = %id, "Updated schema report comment");
            Ok(Outcome::Reconciled(Reconciled::Updated(id)))
        }
    }
}
