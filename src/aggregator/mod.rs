//! GitHub statistics aggregator
//!
//! Every user-level metric follows one shape: run an operation against the
//! public source, run it against the private source, then add or
//! concatenate. [`combine_by_source`] is that shape; [`Insights`] holds the
//! operations built on it.

mod insights;
mod source;

pub use insights::{AggregatorConfig, Insights, UserSummary};
pub use source::{combine_by_source, concat, RepoSource};
