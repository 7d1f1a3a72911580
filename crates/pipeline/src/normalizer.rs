//! Score normalization.
//!
//! Each source speaks in its own units (mutual connections, liked tweets,
//! category overlap, ...). The normalizer maps all of them onto a common
//! 0-100 scale so candidates from different sources can be ranked together.

use crate::config::ScoreThresholds;
use social_graph::UserId;
use sources::{Candidate, Signal, Source};
use std::cmp::Ordering;

pub const MAX_SCORE: f32 = 100.0;

/// Interest scores split into category overlap and interest strength
const CATEGORY_POINTS: f32 = 60.0;
const INTEREST_STRENGTH_POINTS: f32 = 40.0;

/// A candidate with its normalized score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub user_id: UserId,
    pub source: Source,
    pub signal: Signal,
    /// Always within `0.0..=100.0`
    pub score: f32,
}

/// Ranking order: score DESC, then source priority, then user id ASC
pub fn rank_order(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.source.priority().cmp(&b.source.priority()))
        .then(a.user_id.cmp(&b.user_id))
}

#[derive(Debug, Clone, Default)]
pub struct ScoreNormalizer {
    thresholds: ScoreThresholds,
}

impl ScoreNormalizer {
    pub fn new(thresholds: ScoreThresholds) -> Self {
        Self { thresholds }
    }

    /// Map a raw signal onto 0-100.
    ///
    /// Total: a signal whose shape doesn't belong to `source` scores 0.
    pub fn score(&self, source: Source, signal: &Signal) -> f32 {
        let t = &self.thresholds;
        match (source, *signal) {
            (Source::FriendsOfFriends, Signal::MutualConnections(count)) => {
                saturating_share(count, t.mutual_connections, MAX_SCORE)
            }
            (Source::Likes, Signal::Interactions(count)) => {
                saturating_share(count, t.likes, MAX_SCORE)
            }
            (Source::Replies, Signal::Interactions(count)) => {
                saturating_share(count, t.replies, MAX_SCORE)
            }
            (
                Source::Interests,
                Signal::SharedInterests {
                    common_categories,
                    avg_interest_score,
                },
            ) => self.interest_score(common_categories, avg_interest_score),
            (Source::FollowersNotFollowed, Signal::FollowsYou) => {
                clamp_score(t.follows_you_score)
            }
            _ => 0.0,
        }
    }

    pub fn score_candidate(&self, candidate: Candidate) -> ScoredCandidate {
        let score = self.score(candidate.source, &candidate.signal);
        ScoredCandidate {
            user_id: candidate.user_id,
            source: candidate.source,
            signal: candidate.signal,
            score,
        }
    }

    fn interest_score(&self, common_categories: u32, avg_interest_score: f32) -> f32 {
        if common_categories == 0 {
            return 0.0;
        }
        let overlap = saturating_share(
            common_categories,
            self.thresholds.common_categories,
            CATEGORY_POINTS,
        );
        let strength = clamp_score(avg_interest_score) * INTEREST_STRENGTH_POINTS / MAX_SCORE;
        (overlap + strength).min(MAX_SCORE)
    }
}

/// `min(count / threshold * ceiling, ceiling)`, 0 for a zero count
fn saturating_share(count: u32, threshold: u32, ceiling: f32) -> f32 {
    if count == 0 {
        return 0.0;
    }
    if threshold == 0 {
        return ceiling;
    }
    (count as f32 * ceiling / threshold as f32).min(ceiling)
}

/// Clamp into 0-100, mapping NaN to 0
fn clamp_score(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_SCORE)
    }
}
