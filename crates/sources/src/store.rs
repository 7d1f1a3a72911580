//! The query-execution collaborator the recommendation engine talks to.
//!
//! [`SocialStore`] is the seam between the engine and whatever backs it:
//! the five candidate queries, the popularity query, profile lookups and
//! relationship checks. [`GraphStore`] implements it over an in-memory
//! [`SocialGraph`], running the heavier queries on tokio's blocking pool the
//! same way a database driver would park them on I/O.

use crate::friends_of_friends::FriendsOfFriendsSource;
use crate::interactions::{LikedAuthorsSource, RepliedAuthorsSource};
use crate::popularity::PopularitySource;
use crate::reciprocity::FollowersNotFollowedSource;
use crate::shared_interests::SharedInterestsSource;
use crate::traits::CandidateGenerator;
use crate::types::{Candidate, Source, ViewerContext};
use crate::viewer_context::build_viewer_context;
use async_trait::async_trait;
use social_graph::{GraphError, SocialGraph, UserId, UserProfile};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failures surfaced by a [`SocialStore`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The backing store cannot be reached at all
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("unknown user {0}")]
    UnknownUser(UserId),

    /// A single query failed; other queries may still succeed
    #[error("{query} query failed: {reason}")]
    QueryFailed { query: Source, reason: String },

    /// The task running the query panicked or was cancelled
    #[error("store task failed: {0}")]
    Task(String),
}

impl From<GraphError> for StoreError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::UserNotFound(id) => StoreError::UnknownUser(id),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Read-only queries the recommender needs from the social store.
///
/// Every method may suspend on I/O; implementations must be safe to call
/// concurrently.
#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Run one source's candidate query for `requester`, returning at most `limit`
    async fn fetch_candidates(
        &self,
        source: Source,
        requester: UserId,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError>;

    /// Most-followed active users, verified first
    async fn popular_users(&self, limit: usize) -> Result<Vec<UserId>, StoreError>;

    /// Followed and blocked sets for `requester`
    async fn viewer_context(&self, requester: UserId) -> Result<ViewerContext, StoreError>;

    /// Profiles for the given ids, in no particular order; unknown or deleted ids are omitted
    async fn profiles(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, StoreError>;

    /// Does `follower` follow `followee`?
    async fn is_following(&self, follower: UserId, followee: UserId) -> Result<bool, StoreError>;

    /// Is `user` followed by `by`?
    async fn is_followed(&self, user: UserId, by: UserId) -> Result<bool, StoreError>;
}

/// [`SocialStore`] over an in-memory [`SocialGraph`]
#[derive(Clone)]
pub struct GraphStore {
    graph: Arc<SocialGraph>,
    generators: Arc<Vec<Arc<dyn CandidateGenerator>>>,
    popularity: PopularitySource,
}

impl GraphStore {
    pub fn new(graph: Arc<SocialGraph>) -> Self {
        let generators: Vec<Arc<dyn CandidateGenerator>> = vec![
            Arc::new(FriendsOfFriendsSource::new(Arc::clone(&graph))),
            Arc::new(SharedInterestsSource::new(Arc::clone(&graph))),
            Arc::new(LikedAuthorsSource::new(Arc::clone(&graph))),
            Arc::new(RepliedAuthorsSource::new(Arc::clone(&graph))),
            Arc::new(FollowersNotFollowedSource::new(Arc::clone(&graph))),
        ];
        let popularity = PopularitySource::new(Arc::clone(&graph));

        Self {
            graph,
            generators: Arc::new(generators),
            popularity,
        }
    }

    pub fn graph(&self) -> &Arc<SocialGraph> {
        &self.graph
    }

    fn generator(&self, source: Source) -> Option<Arc<dyn CandidateGenerator>> {
        self.generators
            .iter()
            .find(|generator| generator.source() == source)
            .cloned()
    }
}

/// Run a CPU-bound query on the blocking pool
async fn run_blocking<T, F>(query: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(query)
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

#[async_trait]
impl SocialStore for GraphStore {
    async fn fetch_candidates(
        &self,
        source: Source,
        requester: UserId,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        let generator = self.generator(source).ok_or_else(|| StoreError::QueryFailed {
            query: source,
            reason: "no generator registered".to_string(),
        })?;
        let graph = Arc::clone(&self.graph);

        let candidates = run_blocking(move || {
            let context = build_viewer_context(&graph, requester)?;
            Ok(generator.get_candidates(&context, limit))
        })
        .await?;

        debug!(%source, requester, count = candidates.len(), "Fetched candidates");
        Ok(candidates)
    }

    async fn popular_users(&self, limit: usize) -> Result<Vec<UserId>, StoreError> {
        let popularity = self.popularity.clone();
        run_blocking(move || Ok(popularity.get_popular(limit))).await
    }

    async fn viewer_context(&self, requester: UserId) -> Result<ViewerContext, StoreError> {
        Ok(build_viewer_context(&self.graph, requester)?)
    }

    async fn profiles(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, StoreError> {
        Ok(ids.iter().filter_map(|&id| self.graph.profile(id)).collect())
    }

    async fn is_following(&self, follower: UserId, followee: UserId) -> Result<bool, StoreError> {
        Ok(self.graph.is_following(follower, followee))
    }

    async fn is_followed(&self, user: UserId, by: UserId) -> Result<bool, StoreError> {
        Ok(self.graph.is_following(by, user))
    }
}
