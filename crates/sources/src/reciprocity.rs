//! Followers-not-followed-back Source
//!
//! Users who follow the requester but are not followed back. There is no
//! strength to measure, so candidates carry [`Signal::FollowsYou`] and are
//! ordered by how recently they followed.

use crate::traits::CandidateGenerator;
use crate::types::{Candidate, Signal, Source, ViewerContext};
use crate::viewer_context::is_eligible;
use social_graph::{Follow, SocialGraph};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct FollowersNotFollowedSource {
    graph: Arc<SocialGraph>,
}

impl FollowersNotFollowedSource {
    pub fn new(graph: Arc<SocialGraph>) -> Self {
        Self { graph }
    }
}

impl CandidateGenerator for FollowersNotFollowedSource {
    fn source(&self) -> Source {
        Source::FollowersNotFollowed
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn get_candidates(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate> {
        let mut followers: Vec<&Follow> = self
            .graph
            .followers_of(context.user_id)
            .iter()
            .filter(|edge| is_eligible(&self.graph, context, edge.follower_id))
            .collect();

        followers.sort_unstable_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(a.follower_id.cmp(&b.follower_id))
        });
        followers.truncate(limit);

        let candidates: Vec<Candidate> = followers
            .into_iter()
            .map(|edge| {
                Candidate::new(edge.follower_id, Source::FollowersNotFollowed, Signal::FollowsYou)
                    .with_last_interaction(edge.created_at)
            })
            .collect();

        debug!("Generated {} followers-not-followed candidates", candidates.len());
        candidates
    }
}
