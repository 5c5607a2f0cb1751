//! GitInsights - Personal GitHub analytics
//!
//! Authenticates against the GitHub REST API with a user token and
//! aggregates statistics across the user's public and private repositories:
//! languages, issue counts, commits and coded lines, repository, fork and
//! star counts, and first-activity dates.
//!
//! # Architecture
//!
//! - **github**: typed API records and the authenticated JSON transport
//! - **dated**: oldest / most-recent selection over dated records
//! - **aggregator**: repository sources and the statistics service
//! - **config**: YAML configuration and validation
//! - **logging**: tracing subscriber setup

pub mod aggregator;
pub mod config;
pub mod dated;
pub mod error;
pub mod github;
pub mod logging;

// Re-exports
pub use aggregator::{AggregatorConfig, Insights, RepoSource, UserSummary};
pub use error::{ok_or_empty, ErrorKind, InsightsError, Result};
