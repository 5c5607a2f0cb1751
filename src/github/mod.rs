//! GitHub REST API access
//!
//! - **models**: typed records decoded from API responses
//! - **transport**: authenticated JSON requests ([`Transport`], [`HttpTransport`])
//! - **mock**: in-memory [`Transport`] for tests

pub mod mock;
pub mod models;
pub mod transport;

pub use mock::MockTransport;
pub use models::{
    merge_languages, Account, Commit, CommitDetail, CommitStats, GitCommit, Issue, IssueRepository,
    IssueState, LanguageBreakdown, Repository, Signature, User,
};
pub use transport::{fetch, HttpTransport, Target, Transport, GITHUB_MEDIA_TYPE};
