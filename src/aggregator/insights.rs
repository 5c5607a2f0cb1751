//! Statistics aggregation over the GitHub REST API

use super::source::{combine_by_source, concat, RepoSource};
use crate::config::{InsightsConfig, PrivateScope};
use crate::dated::{last_n, oldest_commit, oldest_of, oldest_repository, Dated};
use crate::github::{
    fetch, Commit, CommitDetail, Issue, IssueState, LanguageBreakdown, Repository, Target,
    Transport, User,
};
use crate::{ok_or_empty, InsightsError, Result};
use chrono::{DateTime, Utc};
use futures::{future, stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Aggregator configuration
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// How many of the most recent personal commits feed the coded-lines count
    pub recent_commit_window: usize,

    /// Cap on sibling requests in flight during a fan-out (None = unbounded)
    pub max_concurrent_requests: Option<usize>,

    /// Scope of [`RepoSource::Private`]
    pub private_scope: PrivateScope,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            recent_commit_window: 100,
            max_concurrent_requests: None,
            private_scope: PrivateScope::AllVisible,
        }
    }
}

impl From<&InsightsConfig> for AggregatorConfig {
    fn from(config: &InsightsConfig) -> Self {
        Self {
            recent_commit_window: config.recent_commit_window,
            max_concurrent_requests: config.max_concurrent_requests,
            private_scope: config.private_scope,
        }
    }
}

/// Every dashboard metric in one serialisable record
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub login: String,
    pub location: Option<String>,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub first_repository_date: Option<DateTime<Utc>>,
    pub first_commit_date: Option<DateTime<Utc>>,
    pub opened_issues: usize,
    pub closed_issues: usize,
    pub commits: usize,
    pub coded_lines: u64,
    pub created_repositories: usize,
    pub forked_repositories: usize,
    pub stars: u64,
}

/// Stateless statistics service for the user behind one token
///
/// Nothing is cached between calls: each operation issues its own requests
/// and any failing request fails the operation.
pub struct Insights {
    transport: Arc<dyn Transport>,
    agg_config: AggregatorConfig,
}

impl Insights {
    pub fn new(transport: Arc<dyn Transport>, agg_config: AggregatorConfig) -> Self {
        Self {
            transport,
            agg_config,
        }
    }

    pub fn with_defaults(transport: Arc<dyn Transport>) -> Self {
        Self::new(transport, AggregatorConfig::default())
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.agg_config
    }

    async fn get<T: DeserializeOwned>(&self, target: Target) -> Result<T> {
        fetch(self.transport.as_ref(), &target).await
    }

    /// Run `f` over every item concurrently, keeping input order.
    ///
    /// Honours `max_concurrent_requests`. The first error fails the batch.
    async fn fan_out<I, F, Fut, T>(&self, items: I, f: F) -> Result<Vec<T>>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let pending = items.into_iter().map(f);
        match self.agg_config.max_concurrent_requests {
            Some(limit) => {
                stream::iter(pending)
                    .buffered(limit.max(1))
                    .try_collect()
                    .await
            }
            None => future::try_join_all(pending).await,
        }
    }

    // --- Profile ---------------------------------------------------------

    /// Authenticated user's profile
    pub async fn user(&self) -> Result<User> {
        self.get(Target::path("/user")).await
    }

    pub async fn login(&self) -> Result<String> {
        Ok(self.user().await?.login)
    }

    pub async fn user_location(&self) -> Result<Option<String>> {
        Ok(self.user().await?.location)
    }

    pub async fn user_avatar_url(&self) -> Result<String> {
        Ok(self.user().await?.avatar_url)
    }

    pub async fn user_creation(&self) -> Result<DateTime<Utc>> {
        Ok(self.user().await?.created_at)
    }

    // --- Timeline --------------------------------------------------------

    /// Oldest date across both sources.
    ///
    /// `fetch_source` lists the items of one source and `rank` picks that
    /// list's oldest item. A source with nothing to rank drops out; only
    /// when both are empty is the result [`InsightsError::EmptyResult`].
    pub async fn user_first_date<T, F, Fut, R>(
        &self,
        fetch_source: F,
        rank: R,
    ) -> Result<DateTime<Utc>>
    where
        T: Dated,
        F: Fn(RepoSource) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
        R: Fn(Vec<T>) -> Result<T>,
    {
        let rank = &rank;
        let (public, private) = combine_by_source(
            |source| {
                let pending = fetch_source(source);
                async move { ok_or_empty(rank(pending.await?)) }
            },
            |public, private| (public, private),
        )
        .await?;

        match (public, private) {
            (Some(public), Some(private)) => Ok(oldest_of(public, private).date()),
            (Some(only), None) | (None, Some(only)) => Ok(only.date()),
            (None, None) => Err(InsightsError::EmptyResult(
                "nothing dated in either source".to_string(),
            )),
        }
    }

    pub async fn user_first_repository_date(&self) -> Result<DateTime<Utc>> {
        let date = self
            .user_first_date(|source| self.personal_repos(source), oldest_repository)
            .await?;
        info!(date = %date, "First repository date");
        Ok(date)
    }

    pub async fn user_first_commit_date(&self) -> Result<DateTime<Utc>> {
        let date = self
            .user_first_date(|source| self.repos_personal_commits(source), oldest_commit)
            .await?;
        info!(date = %date, "First commit date");
        Ok(date)
    }

    // --- Languages -------------------------------------------------------

    /// Bytes of code per language for `owner/name`
    pub async fn repo_languages(&self, full_name: &str) -> Result<LanguageBreakdown> {
        self.get(Target::path(format!("/repos/{}/languages", full_name)))
            .await
    }

    /// One breakdown per repository visible to the token, not merged.
    ///
    /// Always lists `/user/repos` in full, whatever the private scope.
    pub async fn user_languages(&self) -> Result<Vec<LanguageBreakdown>> {
        let repos = self.visible_repos().await?;
        debug!(repos = repos.len(), "Fetching languages per repository");
        self.fan_out(&repos, |repo| self.repo_languages(&repo.full_name))
            .await
    }

    // --- Issues ----------------------------------------------------------

    /// Issues assigned to the user across owned and member repositories
    pub async fn issues(&self) -> Result<Vec<Issue>> {
        self.get(Target::path("/user/issues")).await
    }

    pub async fn user_issues_by_state(&self, state: IssueState) -> Result<usize> {
        let count = count_issues(&self.issues().await?, state);
        info!(state = %state, count, "Issues by state");
        Ok(count)
    }

    pub async fn user_opened_issues(&self) -> Result<usize> {
        self.user_issues_by_state(IssueState::Open).await
    }

    pub async fn user_closed_issues(&self) -> Result<usize> {
        self.user_issues_by_state(IssueState::Closed).await
    }

    // --- Commits and coded lines ----------------------------------------

    pub async fn repo_commits(&self, full_name: &str) -> Result<Vec<Commit>> {
        self.get(Target::path(format!("/repos/{}/commits", full_name)))
            .await
    }

    /// Commits attributed to the user across every repository of `source`,
    /// flattened into one list. Unattributed commits are dropped.
    pub async fn repos_personal_commits(&self, source: RepoSource) -> Result<Vec<Commit>> {
        let repos = self.repos(source).await?;
        let login = self.login().await?;

        debug!(source = %source, repos = repos.len(), "Fetching commits per repository");
        let per_repo = self
            .fan_out(&repos, |repo| self.repo_commits(&repo.full_name))
            .await?;

        let commits: Vec<Commit> = per_repo
            .into_iter()
            .flatten()
            .filter(|commit| commit.is_authored_by(&login))
            .collect();

        debug!(source = %source, commits = commits.len(), "Personal commits");
        Ok(commits)
    }

    /// Lines added by the most recent personal commits of both sources.
    ///
    /// Takes the `recent_commit_window` newest commits of the union and
    /// fetches each commit's detail for its stats.
    pub async fn repos_count_coded_lines_for_recent_commits(
        &self,
        first: RepoSource,
        second: RepoSource,
    ) -> Result<u64> {
        let (first_commits, second_commits) = futures::try_join!(
            self.repos_personal_commits(first),
            self.repos_personal_commits(second)
        )?;

        let recent = last_n(
            concat(first_commits, second_commits),
            self.agg_config.recent_commit_window,
        );

        debug!(commits = recent.len(), "Fetching commit stats");
        let details = self
            .fan_out(&recent, |commit| {
                self.get::<CommitDetail>(Target::url(commit.url.clone()))
            })
            .await?;

        Ok(details.iter().map(|detail| detail.stats.additions).sum())
    }

    pub async fn user_count_coded_lines(&self) -> Result<u64> {
        let lines = self
            .repos_count_coded_lines_for_recent_commits(RepoSource::Public, RepoSource::Private)
            .await?;
        info!(lines, "Coded lines");
        Ok(lines)
    }

    pub async fn user_count_commits(&self) -> Result<usize> {
        let count = combine_by_source(
            |source| self.repos_personal_commits(source),
            |public, private| public.len() + private.len(),
        )
        .await?;
        info!(count, "Commits");
        Ok(count)
    }

    // --- Repositories ----------------------------------------------------

    /// Public repositories listed under the user's login
    pub async fn public_repos(&self) -> Result<Vec<Repository>> {
        let login = self.login().await?;
        self.get(Target::path(format!(
            "/users/{}/repos",
            urlencoding::encode(&login)
        )))
        .await
    }

    /// Every repository the token can see, public and private
    pub async fn visible_repos(&self) -> Result<Vec<Repository>> {
        self.get(Target::path("/user/repos")).await
    }

    /// The private source, narrowed according to the configured scope
    pub async fn private_repos(&self) -> Result<Vec<Repository>> {
        let repos = self.visible_repos().await?;
        Ok(match self.agg_config.private_scope {
            PrivateScope::AllVisible => repos,
            PrivateScope::PrivateOnly => repos.into_iter().filter(|repo| repo.private).collect(),
        })
    }

    pub async fn repos(&self, source: RepoSource) -> Result<Vec<Repository>> {
        match source {
            RepoSource::Public => self.public_repos().await,
            RepoSource::Private => self.private_repos().await,
        }
    }

    /// Repositories of `source` owned by the user
    pub async fn personal_repos(&self, source: RepoSource) -> Result<Vec<Repository>> {
        let (repos, login) = futures::try_join!(self.repos(source), self.login())?;
        Ok(repos
            .into_iter()
            .filter(|repo| repo.is_owned_by(&login))
            .collect())
    }

    pub async fn repos_count_forked_repositories(&self, source: RepoSource) -> Result<usize> {
        Ok(self
            .repos(source)
            .await?
            .iter()
            .filter(|repo| repo.fork)
            .count())
    }

    pub async fn repos_count_stars_repositories(&self, source: RepoSource) -> Result<u64> {
        Ok(self
            .repos(source)
            .await?
            .iter()
            .map(|repo| repo.stargazers_count)
            .sum())
    }

    /// Owned repositories of both sources, forks included
    pub async fn user_count_created_repositories(&self) -> Result<usize> {
        let count = combine_by_source(
            |source| self.personal_repos(source),
            |public, private| public.len() + private.len(),
        )
        .await?;
        info!(count, "Created repositories");
        Ok(count)
    }

    pub async fn user_count_forked_repositories(&self) -> Result<usize> {
        let count = combine_by_source(
            |source| self.repos_count_forked_repositories(source),
            |public, private| public + private,
        )
        .await?;
        info!(count, "Forked repositories");
        Ok(count)
    }

    pub async fn user_count_stars_repositories(&self) -> Result<u64> {
        let count = combine_by_source(
            |source| self.repos_count_stars_repositories(source),
            |public, private| public + private,
        )
        .await?;
        info!(count, "Stars");
        Ok(count)
    }

    // --- Summary ---------------------------------------------------------

    /// Every metric at once. Empty first dates become `None`; any other
    /// failure fails the summary.
    pub async fn summary(&self) -> Result<UserSummary> {
        let (
            user,
            issues,
            first_repository_date,
            first_commit_date,
            commits,
            coded_lines,
            created_repositories,
            forked_repositories,
            stars,
        ) = futures::try_join!(
            self.user(),
            self.issues(),
            placeholder(self.user_first_repository_date()),
            placeholder(self.user_first_commit_date()),
            self.user_count_commits(),
            self.user_count_coded_lines(),
            self.user_count_created_repositories(),
            self.user_count_forked_repositories(),
            self.user_count_stars_repositories(),
        )?;

        Ok(UserSummary {
            login: user.login,
            location: user.location,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            first_repository_date,
            first_commit_date,
            opened_issues: count_issues(&issues, IssueState::Open),
            closed_issues: count_issues(&issues, IssueState::Closed),
            commits,
            coded_lines,
            created_repositories,
            forked_repositories,
            stars,
        })
    }
}

fn count_issues(issues: &[Issue], state: IssueState) -> usize {
    issues.iter().filter(|issue| issue.state == state).count()
}

async fn placeholder<T>(pending: impl Future<Output = Result<T>>) -> Result<Option<T>> {
    ok_or_empty(pending.await)
}
