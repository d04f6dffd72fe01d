//! Webhook endpoint handler.
//!
//! Verifies the delivery's signature, decodes `pull_request` events and hands
//! them to a background task before responding. The signature is the only
//! thing that can fail the request: everything after it is logged and
//! acknowledged. The pipeline runs detached from the request, so GitHub
//! closing the connection (it waits about ten seconds) cannot cancel a
//! delivery halfway; the delivery timeout bounds it instead.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::api::Authenticator;
use crate::reconcile::process_delivery;
use crate::types::DeliveryId;
use crate::webhooks::{parse_webhook, verify_signature};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for the HMAC-SHA1 signature.
const HEADER_SIGNATURE: &str = "x-hub-signature";

/// Errors that fail a webhook request.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("invalid signature")]
    InvalidSignature,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-Hub-Signature`: `sha1=` HMAC-SHA1 of the raw body (required)
///   - `X-GitHub-Event`: event type; only `pull_request` is processed
///   - `X-GitHub-Delivery`: delivery ID, used for log correlation
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: signature valid; the event was accepted for processing or
///   ignored
/// - 500 Internal Server Error: signature missing or invalid
pub async fn webhook_handler<A: Authenticator + 'static>(
    State(app_state): State<AppState<A>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let signature_header =
        get_header(&headers, HEADER_SIGNATURE).ok_or(WebhookError::MissingSignature)?;
    let delivery_id = DeliveryId::new(get_header(&headers, HEADER_DELIVERY).unwrap_or_default());

    // Nothing is parsed before the signature checks out.
    if !verify_signature(&body, &signature_header, app_state.webhook_secret()) {
        warn!(delivery_id = %delivery_id, "Invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    let Some(event_type) = get_header(&headers, HEADER_EVENT) else {
        warn!(delivery_id = %delivery_id, "Webhook without event type");
        return Ok((StatusCode::OK, "Ignored"));
    };

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    let event = match parse_webhook(&event_type, delivery_id.clone(), &body) {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(delivery_id = %delivery_id, event_type = %event_type, "Ignoring event");
            return Ok((StatusCode::OK, "Ignored"));
        }
        Err(e) => {
            warn!(delivery_id = %delivery_id, error = %e, "Failed to parse webhook payload");
            return Ok((StatusCode::OK, "Ignored"));
        }
    };

    let state = app_state.clone();
    app_state.tasks().spawn(async move {
        // Outcomes and errors are logged inside the delivery span.
        let _ = process_delivery(state.authenticator(), state.settings(), event).await;
    });

    Ok((StatusCode::OK, "Accepted"))
}

/// Extracts a header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
