//! GitHub App authentication.
//!
//! The App-level client signs JWTs with the App's private key. For every
//! delivery it is exchanged for an installation token, yielding a client that
//! is used for that delivery only and then dropped. Token lifetime and refresh
//! are octocrab's concern.

use std::time::Duration;

use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId as OctocrabInstallationId};
use octocrab::service::middleware::retry::RetryConfig;

use crate::api::Authenticator;
use crate::types::{InstallationId, RepoId};

use super::client::OctocrabClient;
use super::error::GitHubApiError;

/// App-level GitHub credentials.
#[derive(Clone)]
pub struct GitHubApp {
    client: Octocrab,
}

impl GitHubApp {
    /// Builds an App client from an RSA private key in PEM format.
    ///
    /// `http_timeout` bounds connecting to and reading from the API. Octocrab's
    /// retry layer is disabled: a failed call is reported, never repeated.
    pub fn new(
        app_id: u64,
        private_key_pem: &[u8],
        http_timeout: Duration,
    ) -> Result<Self, GitHubAppError> {
        let key = jsonwebtoken::EncodingKey::from_rsa_pem(private_key_pem)?;

        let client = Octocrab::builder()
            .app(AppId(app_id), key)
            .add_retry_config(RetryConfig::None)
            .set_connect_timeout(Some(http_timeout))
            .set_read_timeout(Some(http_timeout))
            .build()?;

        Ok(Self { client })
    }
}

impl Authenticator for GitHubApp {
    type Client = OctocrabClient;

    async fn authenticate(
        &self,
        installation: InstallationId,
        repo: RepoId,
    ) -> Result<OctocrabClient, GitHubApiError> {
        let (client, _token) = self
            .client
            .installation_and_token(OctocrabInstallationId(installation.0))
            .await
            .map_err(GitHubApiError::from_octocrab)?;

        Ok(OctocrabClient::new(client, repo))
    }
}

impl std::fmt::Debug for GitHubApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApp").finish_non_exhaustive()
    }
}

/// Errors building the App client at startup.
#[derive(Debug, thiserror::Error)]
pub enum GitHubAppError {
    #[error("invalid App private key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),

    #[error("failed to build GitHub client: {0}")]
    Client(#[from] octocrab::Error),
}
