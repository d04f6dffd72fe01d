//! GraphQL Schema Police - a GitHub App that reports breaking GraphQL schema
//! changes on pull requests.
//!
//! For every opened or updated pull request in an opted-in repository, the
//! changed `.graphql`/`.gql` files are compared between the merge base and
//! the head, and the result is kept in a single bot comment on the PR.

pub mod api;
pub mod config;
pub mod github;
pub mod reconcile;
pub mod report;
pub mod schema;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub mod test_utils;
