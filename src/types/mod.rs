//! Core domain types for the schema police bot.

pub mod ids;
pub mod pr;

pub use ids::{CommentId, DeliveryId, InstallationId, PrNumber, RepoId, Sha};
pub use pr::{ChangedFile, FileStatus, PullRequestPayload, RepoRef};
