//! Repository sources and the per-source combinator

use crate::Result;
use std::fmt;
use std::future::Future;

/// Which repository listing an operation runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoSource {
    /// `/users/{login}/repos`: the user's public repositories
    Public,

    /// `/user/repos`: everything the token can see, narrowed by
    /// [`PrivateScope`](crate::config::PrivateScope)
    Private,
}

impl RepoSource {
    pub const ALL: [RepoSource; 2] = [RepoSource::Public, RepoSource::Private];
}

impl fmt::Display for RepoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoSource::Public => write!(f, "public"),
            RepoSource::Private => write!(f, "private"),
        }
    }
}

/// Run `op` against the public and the private source, then merge the two
/// results with `combine`.
///
/// Both sides run concurrently. Either side failing fails the whole call.
pub async fn combine_by_source<T, U, F, Fut, C>(op: F, combine: C) -> Result<U>
where
    F: Fn(RepoSource) -> Fut,
    Fut: Future<Output = Result<T>>,
    C: FnOnce(T, T) -> U,
{
    let (public, private) = futures::try_join!(op(RepoSource::Public), op(RepoSource::Private))?;
    Ok(combine(public, private))
}

/// Concatenate two lists, public first
pub fn concat<T>(mut public: Vec<T>, private: Vec<T>) -> Vec<T> {
    public.extend(private);
    public
}
