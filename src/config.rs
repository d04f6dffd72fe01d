//! Process configuration.
//!
//! Every option can be given as a flag or through the environment; secrets are
//! normally passed through the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::github::GitHubAppError;
use crate::reconcile::{DEFAULT_BOT_LOGIN, DEFAULT_WEB_URL, PipelineSettings};

#[derive(Clone, Parser)]
#[command(name = "graphql-schema-police")]
#[command(version, about = "Reports breaking GraphQL schema changes on pull requests")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Secret shared with GitHub for webhook signatures.
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: String,

    /// GitHub App ID.
    #[arg(long, env = "APP_ID")]
    pub app_id: u64,

    /// Path to the GitHub App's private key (PEM).
    #[arg(long, env = "PRIVATE_KEY_PATH")]
    pub private_key_path: PathBuf,

    /// Login the App comments as; identifies the bot's own comment.
    #[arg(long, env = "BOT_LOGIN", default_value = DEFAULT_BOT_LOGIN)]
    pub bot_login: String,

    /// Base URL for file links in comments.
    #[arg(long, env = "GITHUB_WEB_URL", default_value = DEFAULT_WEB_URL)]
    pub github_web_url: String,

    /// Wall-clock budget for handling one delivery, in seconds.
    #[arg(long, env = "DELIVERY_TIMEOUT_SECS", default_value_t = 60)]
    pub delivery_timeout_secs: u64,

    /// Connect and read timeout for GitHub API calls, in seconds.
    #[arg(long, env = "HTTP_TIMEOUT_SECS", default_value_t = 15)]
    pub http_timeout_secs: u64,

    /// Maximum number of comment pages scanned for the bot's comment.
    #[arg(
        long,
        env = "MAX_COMMENT_PAGES",
        default_value_t = 20,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_comment_pages: u32,
}

/// Errors during startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read private key {path}: {source}")]
    ReadPrivateKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    GitHubApp(#[from] GitHubAppError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl Config {
    pub fn read_private_key(&self) -> Result<Vec<u8>, ConfigError> {
        std::fs::read(&self.private_key_path).map_err(|source| ConfigError::ReadPrivateKey {
            path: self.private_key_path.clone(),
            source,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            bot_login: self.bot_login.clone(),
            web_url: self.github_web_url.clone(),
            max_comment_pages: self.max_comment_pages,
            delivery_timeout: Duration::from_secs(self.delivery_timeout_secs),
        }
    }
}
