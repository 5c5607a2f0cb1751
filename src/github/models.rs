//! Typed records for the GitHub REST API (v3)
//!
//! Only the fields the aggregations read are modelled. Required fields are
//! not defaulted, so a response missing one fails decoding instead of
//! leaking nulls into the arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Account login, as embedded in repository and commit payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

/// Authenticated user profile (`GET /user`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub location: Option<String>,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// Repository listing entry (`/user/repos`, `/users/{login}/repos`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub owner: Account,
    pub fork: bool,
    #[serde(default)]
    pub private: bool,
    pub stargazers_count: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub language: Option<String>,
}

impl Repository {
    pub fn is_owned_by(&self, login: &str) -> bool {
        self.owner.login == login
    }
}

/// Name/email/date triple inside the git commit object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitCommit {
    pub author: Signature,
    pub committer: Signature,
    #[serde(default)]
    pub message: String,
}

/// Commit listing entry (`/repos/{owner}/{repo}/commits`)
///
/// `author` is the GitHub account GitHub matched to the git author; it is
/// absent when the email is not linked to any account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    /// API URL of the commit detail resource
    pub url: String,
    pub commit: GitCommit,
    #[serde(default)]
    pub author: Option<Account>,
}

impl Commit {
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.login.as_str())
    }

    /// Attributed to `login`; unattributed commits never match
    pub fn is_authored_by(&self, login: &str) -> bool {
        self.author_login() == Some(login)
    }

    pub fn authored_at(&self) -> DateTime<Utc> {
        self.commit.author.date
    }

    pub fn committed_at(&self) -> DateTime<Utc> {
        self.commit.committer.date
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub additions: u64,
    pub deletions: u64,
    pub total: u64,
}

/// Commit detail resource, fetched through [`Commit::url`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub sha: Option<String>,
    pub stats: CommitStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRepository {
    pub full_name: String,
}

/// Issue assigned to the authenticated user (`GET /user/issues`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub number: Option<u64>,
    pub state: IssueState,
    #[serde(default)]
    pub repository: Option<IssueRepository>,
}

/// Language name to bytes of code (`/repos/{owner}/{repo}/languages`)
pub type LanguageBreakdown = BTreeMap<String, u64>;

/// Sum per-repository breakdowns into one map
pub fn merge_languages<'a>(
    breakdowns: impl IntoIterator<Item = &'a LanguageBreakdown>,
) -> LanguageBreakdown {
    let mut merged = LanguageBreakdown::new();
    for breakdown in breakdowns {
        for (language, bytes) in breakdown {
            *merged.entry(language.clone()).or_insert(0) += bytes;
        }
    }
    merged
}
