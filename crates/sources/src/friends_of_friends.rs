//! Friends-of-friends Source
//!
//! "Followed by people you follow."
//!
//! ## Algorithm
//! 1. Take every account the requester follows
//! 2. Walk each of their outgoing follow edges
//! 3. Count, per reachable user, how many of the requester's followees follow them
//! 4. Drop excluded and deleted users, sort by count, truncate
//!
//! The walk over followees runs on rayon with a fold/reduce so each worker
//! builds its own partial count map.

use crate::traits::CandidateGenerator;
use crate::types::{Candidate, Signal, Source, ViewerContext};
use crate::viewer_context::is_eligible;
use rayon::prelude::*;
use social_graph::{SocialGraph, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Generates candidates reachable through the requester's followees
#[derive(Clone)]
pub struct FriendsOfFriendsSource {
    graph: Arc<SocialGraph>,

    /// Minimum mutual connections before a user is considered
    min_mutual_connections: u32,
}

impl FriendsOfFriendsSource {
    pub fn new(graph: Arc<SocialGraph>) -> Self {
        Self {
            graph,
            min_mutual_connections: 1,
        }
    }

    /// Configure minimum mutual connections (default: 1)
    pub fn with_min_mutual_connections(mut self, min: u32) -> Self {
        self.min_mutual_connections = min.max(1);
        self
    }

    /// Mutual-connection count for every eligible second-degree user
    fn count_mutual_connections(&self, context: &ViewerContext) -> HashMap<UserId, u32> {
        let followees: Vec<UserId> = context.following.iter().copied().collect();

        followees
            .par_iter()
            .fold(HashMap::new, |mut local_counts: HashMap<UserId, u32>, &followee| {
                for edge in self.graph.following_of(followee) {
                    if is_eligible(&self.graph, context, edge.followee_id) {
                        *local_counts.entry(edge.followee_id).or_insert(0) += 1;
                    }
                }
                local_counts
            })
            .reduce(HashMap::new, |mut acc, local_counts| {
                for (user_id, count) in local_counts {
                    *acc.entry(user_id).or_insert(0) += count;
                }
                acc
            })
    }
}

impl CandidateGenerator for FriendsOfFriendsSource {
    fn source(&self) -> Source {
        Source::FriendsOfFriends
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn get_candidates(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate> {
        let mutual_counts = self.count_mutual_connections(context);
        debug!("Found {} second-degree users", mutual_counts.len());

        let mut ranked: Vec<(UserId, u32)> = mutual_counts
            .into_iter()
            .filter(|(_, count)| *count >= self.min_mutual_connections)
            .collect();

        // Count DESC, then user id so equal counts come back in a stable order
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);

        let candidates: Vec<Candidate> = ranked
            .into_iter()
            .map(|(user_id, count)| {
                Candidate::new(
                    user_id,
                    Source::FriendsOfFriends,
                    Signal::MutualConnections(count),
                )
            })
            .collect();

        debug!("Generated {} friends-of-friends candidates", candidates.len());
        candidates
    }
}
