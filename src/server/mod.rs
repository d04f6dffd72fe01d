//! HTTP server for the schema check bot.
//!
//! # Endpoints
//!
//! - `POST /webhook` - Accepts GitHub webhook deliveries and runs the pipeline
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use tokio_util::task::TaskTracker;

use crate::api::Authenticator;
use crate::reconcile::PipelineSettings;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

/// Shared application state.
///
/// Immutable after startup; handlers receive it through Axum's `State`
/// extractor.
pub struct AppState<A> {
    inner: Arc<AppStateInner<A>>,

    /// Deliveries still being processed after their request was answered.
    tasks: TaskTracker,
}

struct AppStateInner<A> {
    /// Webhook secret for HMAC-SHA1 signature verification.
    webhook_secret: Vec<u8>,

    /// Mints a repository-scoped client per delivery.
    authenticator: A,

    settings: PipelineSettings,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
            tasks: self.tasks.clone(),
        }
    }
}

impl<A: Authenticator> AppState<A> {
    pub fn new(
        webhook_secret: impl Into<Vec<u8>>,
        authenticator: A,
        settings: PipelineSettings,
    ) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                webhook_secret: webhook_secret.into(),
                authenticator,
                settings,
            }),
            tasks: TaskTracker::new(),
        }
    }

    /// Returns the webhook secret.
    pub fn webhook_secret(&self) -> &[u8] {
        &self.inner.webhook_secret
    }

    pub fn authenticator(&self) -> &A {
        &self.inner.authenticator
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.inner.settings
    }

    /// In-flight deliveries. Close and wait on this before exiting so that
    /// accepted deliveries finish.
    pub fn tasks(&self) -> &TaskTracker {
        &self.tasks
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<A: Authenticator + 'static>(app_state: AppState<A>) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/webhook", post(webhook_handler::<A>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
