//! GitHub API client.
//!
//! This module implements the [`crate::api`] traits with the octocrab library.
//!
//! Key features:
//! - GitHub App authentication, one installation client per delivery
//! - Distinguishes not-found, transient and permanent errors
//! - Single-attempt calls: nothing is retried

mod app;
mod client;
mod error;
mod source;

pub use app::{GitHubApp, GitHubAppError};
pub use client::OctocrabClient;
pub use error::GitHubApiError;
pub(crate) use source::encode_path;
