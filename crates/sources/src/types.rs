//! Core types shared by every candidate source.

use serde::{Deserialize, Serialize};
use social_graph::{Timestamp, UserId};
use std::collections::HashSet;
use std::fmt;

/// The five independent "who to follow" strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Followed by people you follow
    FriendsOfFriends,
    /// Shares your interest categories
    Interests,
    /// Wrote tweets you liked
    Likes,
    /// Wrote tweets you replied to
    Replies,
    /// Follows you, you don't follow back
    FollowersNotFollowed,
}

impl Source {
    /// Blending order; earlier sources win cross-source duplicates
    pub const PRIORITY: [Source; 5] = [
        Source::FriendsOfFriends,
        Source::Interests,
        Source::Likes,
        Source::Replies,
        Source::FollowersNotFollowed,
    ];

    /// Position in [`Source::PRIORITY`] (0 = highest priority)
    pub fn priority(self) -> usize {
        match self {
            Source::FriendsOfFriends => 0,
            Source::Interests => 1,
            Source::Likes => 2,
            Source::Replies => 3,
            Source::FollowersNotFollowed => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Source::FriendsOfFriends => "friends_of_friends",
            Source::Interests => "interests",
            Source::Likes => "likes",
            Source::Replies => "replies",
            Source::FollowersNotFollowed => "followers_not_followed",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw evidence a source attaches to a candidate.
///
/// Each source produces exactly one shape; the normalizer dispatches on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// Number of people the requester follows who also follow the candidate
    MutualConnections(u32),
    /// Categories in common and the candidate's average score across them
    SharedInterests {
        common_categories: u32,
        avg_interest_score: f32,
    },
    /// Distinct liked tweets or replies, depending on the source
    Interactions(u32),
    /// The candidate follows the requester; there is nothing to count
    FollowsYou,
}

/// A user proposed by one source as a possible followee
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub user_id: UserId,
    pub source: Source,
    pub signal: Signal,
    /// Most recent underlying interaction, when the source tracks one
    pub last_interaction: Option<Timestamp>,
}

impl Candidate {
    pub fn new(user_id: UserId, source: Source, signal: Signal) -> Self {
        Self {
            user_id,
            source,
            signal,
            last_interaction: None,
        }
    }

    pub fn with_last_interaction(mut self, at: Timestamp) -> Self {
        self.last_interaction = Some(at);
        self
    }
}

/// Who the requester already follows or has a block with.
///
/// Gathered once per query so the exclusion checks are O(1) lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerContext {
    pub user_id: UserId,
    pub following: HashSet<UserId>,
    /// Users blocked by, or blocking, the requester
    pub blocked: HashSet<UserId>,
}

impl ViewerContext {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    /// True for the requester, anyone they follow, and anyone in a block relation
    pub fn excludes(&self, user_id: UserId) -> bool {
        user_id == self.user_id
            || self.following.contains(&user_id)
            || self.blocked.contains(&user_id)
    }
}
