//! Date-ordered helpers over API records
//!
//! Pure functions: no I/O, and the only failure is asking for the oldest of
//! nothing, which is reported as [`InsightsError::EmptyResult`].

use crate::github::{Commit, Repository};
use crate::{InsightsError, Result};
use chrono::{DateTime, Utc};

/// A record with a single instant used for ordering
pub trait Dated {
    fn date(&self) -> DateTime<Utc>;
}

impl Dated for Repository {
    fn date(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Dated for Commit {
    fn date(&self) -> DateTime<Utc> {
        self.authored_at()
    }
}

/// Item with the earliest date. Ties keep the first one encountered.
pub fn oldest_dated<T: Dated>(items: Vec<T>) -> Result<T> {
    items
        .into_iter()
        .min_by_key(|item| item.date())
        .ok_or_else(|| InsightsError::EmptyResult("no dated items".to_string()))
}

pub fn oldest_repository(repos: Vec<Repository>) -> Result<Repository> {
    oldest_dated(repos)
        .map_err(|_| InsightsError::EmptyResult("no personal repositories".to_string()))
}

pub fn oldest_commit(commits: Vec<Commit>) -> Result<Commit> {
    oldest_dated(commits)
        .map_err(|_| InsightsError::EmptyResult("no personal commits".to_string()))
}

/// Pairwise minimum; `a` wins a tie
pub fn oldest_of<T: Dated>(a: T, b: T) -> T {
    if b.date() < a.date() {
        b
    } else {
        a
    }
}

/// The `n` most recent items, newest first. Returns fewer if fewer exist.
pub fn last_n<T: Dated>(mut items: Vec<T>, n: usize) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(item.date()));
    items.truncate(n);
    items
}
