//! Popularity fallback
//!
//! "Most-followed, verified first." Needs no requester, which makes it both
//! the anonymous path and the backfill for thin personalized results.

use social_graph::{SocialGraph, UserId};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct PopularitySource {
    graph: Arc<SocialGraph>,
}

impl PopularitySource {
    pub fn new(graph: Arc<SocialGraph>) -> Self {
        Self { graph }
    }

    /// Up to `limit` active users ordered by (verified DESC, followers DESC, id ASC)
    #[instrument(skip(self))]
    pub fn get_popular(&self, limit: usize) -> Vec<UserId> {
        let mut ranked: Vec<(bool, u32, UserId)> = self
            .graph
            .users()
            .filter(|user| !user.deleted)
            .map(|user| (user.verified, self.graph.follower_count(user.id), user.id))
            .collect();

        ranked.sort_unstable_by_key(|&(verified, followers, id)| {
            (Reverse(verified), Reverse(followers), id)
        });
        ranked.truncate(limit);

        debug!("Selected {} popular users", ranked.len());
        ranked.into_iter().map(|(_, _, id)| id).collect()
    }
}
