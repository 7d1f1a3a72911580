//! Liked-authors and replied-authors Sources
//!
//! Both rank authors by how often the requester engaged with their tweets:
//! - likes: distinct tweets liked per author
//! - replies: replies written to each author's tweets
//!
//! Ties go to the author engaged with most recently.

use crate::traits::CandidateGenerator;
use crate::types::{Candidate, Signal, Source, ViewerContext};
use crate::viewer_context::is_eligible;
use social_graph::{SocialGraph, Timestamp, TweetId, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Per-author engagement while aggregating
#[derive(Debug, Default)]
struct Tally {
    count: u32,
    last_at: Timestamp,
}

impl Tally {
    fn record(&mut self, at: Timestamp) {
        self.count += 1;
        self.last_at = self.last_at.max(at);
    }
}

/// Sort tallies into candidates: count DESC, most recent DESC, user id ASC
fn rank_authors(tallies: HashMap<UserId, Tally>, source: Source, limit: usize) -> Vec<Candidate> {
    let mut ranked: Vec<(UserId, Tally)> = tallies.into_iter().collect();
    ranked.sort_unstable_by(|(a_id, a), (b_id, b)| {
        b.count
            .cmp(&a.count)
            .then(b.last_at.cmp(&a.last_at))
            .then(a_id.cmp(b_id))
    });
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(user_id, tally)| {
            Candidate::new(user_id, source, Signal::Interactions(tally.count))
                .with_last_interaction(tally.last_at)
        })
        .collect()
}

/// Authors whose tweets the requester liked
#[derive(Clone)]
pub struct LikedAuthorsSource {
    graph: Arc<SocialGraph>,
}

impl LikedAuthorsSource {
    pub fn new(graph: Arc<SocialGraph>) -> Self {
        Self { graph }
    }
}

impl CandidateGenerator for LikedAuthorsSource {
    fn source(&self) -> Source {
        Source::Likes
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn get_candidates(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate> {
        let mut tallies: HashMap<UserId, Tally> = HashMap::new();
        let mut counted: HashSet<TweetId> = HashSet::new();

        for like in self.graph.likes_by(context.user_id) {
            let Some(tweet) = self.graph.get_tweet(like.tweet_id) else {
                continue;
            };
            if !is_eligible(&self.graph, context, tweet.author_id) {
                continue;
            }
            // Count each liked tweet once
            if counted.insert(tweet.id) {
                tallies
                    .entry(tweet.author_id)
                    .or_default()
                    .record(like.created_at);
            }
        }

        let candidates = rank_authors(tallies, Source::Likes, limit);
        debug!("Generated {} liked-author candidates", candidates.len());
        candidates
    }
}

/// Authors whose tweets the requester replied to
#[derive(Clone)]
pub struct RepliedAuthorsSource {
    graph: Arc<SocialGraph>,
}

impl RepliedAuthorsSource {
    pub fn new(graph: Arc<SocialGraph>) -> Self {
        Self { graph }
    }
}

impl CandidateGenerator for RepliedAuthorsSource {
    fn source(&self) -> Source {
        Source::Replies
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn get_candidates(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate> {
        let mut tallies: HashMap<UserId, Tally> = HashMap::new();

        for &tweet_id in self.graph.tweets_by(context.user_id) {
            let Some(reply) = self.graph.get_tweet(tweet_id) else {
                continue;
            };
            let Some(parent) = reply.in_reply_to.and_then(|id| self.graph.get_tweet(id)) else {
                continue;
            };
            if !is_eligible(&self.graph, context, parent.author_id) {
                continue;
            }
            tallies
                .entry(parent.author_id)
                .or_default()
                .record(reply.created_at);
        }

        let candidates = rank_authors(tallies, Source::Replies, limit);
        debug!("Generated {} replied-author candidates", candidates.len());
        candidates
    }
}
