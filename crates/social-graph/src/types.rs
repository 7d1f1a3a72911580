//! Core domain types for the social graph.
//!
//! These mirror the rows the recommendation core reads from the relational
//! store: users, follow edges, block edges, interest scores, tweets and likes.
//! [`SocialGraph`] indexes them in memory so every query the recommender
//! needs is a handful of hash lookups.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u64;

/// Unique identifier for a tweet (replies are tweets too)
pub type TweetId = u64;

/// Unique identifier for an interest category
pub type CategoryId = u32;

/// Unix timestamp in seconds
pub type Timestamp = i64;

// =============================================================================
// Store Records
// =============================================================================

/// A user account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
    /// Soft-deleted accounts stay in the store but are never surfaced
    #[serde(default)]
    pub deleted: bool,
}

/// `follower_id` follows `followee_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
    pub follower_id: UserId,
    pub followee_id: UserId,
    #[serde(default)]
    pub created_at: Timestamp,
}

/// `blocker_id` has blocked `blocked_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub blocker_id: UserId,
    pub blocked_id: UserId,
}

/// How strongly a user is interested in a category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub user_id: UserId,
    pub category_id: CategoryId,
    /// Interest score from 0.0 to 100.0
    pub score: f32,
}

/// A tweet; `in_reply_to` is set when the tweet is a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: TweetId,
    pub author_id: UserId,
    #[serde(default)]
    pub in_reply_to: Option<TweetId>,
    #[serde(default)]
    pub created_at: Timestamp,
}

/// `user_id` liked `tweet_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: UserId,
    pub tweet_id: TweetId,
    #[serde(default)]
    pub created_at: Timestamp,
}

// =============================================================================
// Read Models
// =============================================================================

/// Display fields for a user, including aggregate follow counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub verified: bool,
    pub follower_count: u32,
    pub following_count: u32,
}

// =============================================================================
// SocialGraph - The In-Memory Store
// =============================================================================

/// Holds every record plus the adjacency indices the candidate queries walk.
///
/// Follow edges are indexed in both directions, blocks likewise, and
/// interests are indexed by category so "who else likes category X" is a
/// single lookup.
#[derive(Debug, Default)]
pub struct SocialGraph {
    pub(crate) users: HashMap<UserId, User>,

    /// Outgoing follow edges, keyed by follower
    pub(crate) following: HashMap<UserId, Vec<Follow>>,
    /// Incoming follow edges, keyed by followee
    pub(crate) followers: HashMap<UserId, Vec<Follow>>,
    pub(crate) follow_edges: HashSet<(UserId, UserId)>,

    /// Users each user has blocked
    pub(crate) blocking: HashMap<UserId, HashSet<UserId>>,
    /// Users who have blocked each user
    pub(crate) blocked_by: HashMap<UserId, HashSet<UserId>>,

    pub(crate) interests: HashMap<UserId, Vec<Interest>>,
    pub(crate) category_members: HashMap<CategoryId, Vec<Interest>>,

    pub(crate) tweets: HashMap<TweetId, Tweet>,
    pub(crate) user_tweets: HashMap<UserId, Vec<TweetId>>,
    pub(crate) user_likes: HashMap<UserId, Vec<Like>>,
}

impl SocialGraph {
    /// Creates a new, empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // Getters

    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// True when the user exists and is not soft-deleted
    pub fn is_active(&self, id: UserId) -> bool {
        self.users.get(&id).is_some_and(|u| !u.deleted)
    }

    /// All user ids, sorted ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.users.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Edges where `user_id` is the follower
    pub fn following_of(&self, user_id: UserId) -> &[Follow] {
        self.following
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Edges where `user_id` is the followee
    pub fn followers_of(&self, user_id: UserId) -> &[Follow] {
        self.followers
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Does `follower` follow `followee`?
    pub fn is_following(&self, follower: UserId, followee: UserId) -> bool {
        self.follow_edges.contains(&(follower, followee))
    }

    pub fn follower_count(&self, user_id: UserId) -> u32 {
        self.followers_of(user_id).len() as u32
    }

    pub fn following_count(&self, user_id: UserId) -> u32 {
        self.following_of(user_id).len() as u32
    }

    /// Everyone `user_id` has blocked plus everyone who has blocked them
    pub fn block_relations(&self, user_id: UserId) -> HashSet<UserId> {
        let mut related = HashSet::new();
        if let Some(blocked) = self.blocking.get(&user_id) {
            related.extend(blocked.iter().copied());
        }
        if let Some(blockers) = self.blocked_by.get(&user_id) {
            related.extend(blockers.iter().copied());
        }
        related
    }

    /// Is there a block between `a` and `b` in either direction?
    pub fn is_blocked_either_way(&self, a: UserId, b: UserId) -> bool {
        self.blocking.get(&a).is_some_and(|s| s.contains(&b))
            || self.blocking.get(&b).is_some_and(|s| s.contains(&a))
    }

    pub fn interests_of(&self, user_id: UserId) -> &[Interest] {
        self.interests
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every interest row declared for a category
    pub fn category_members(&self, category_id: CategoryId) -> &[Interest] {
        self.category_members
            .get(&category_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_tweet(&self, id: TweetId) -> Option<&Tweet> {
        self.tweets.get(&id)
    }

    /// Ids of tweets authored by the user, in insertion order
    pub fn tweets_by(&self, user_id: UserId) -> &[TweetId] {
        self.user_tweets
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn likes_by(&self, user_id: UserId) -> &[Like] {
        self.user_likes
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Display profile for an active user; `None` for unknown or deleted users
    pub fn profile(&self, user_id: UserId) -> Option<UserProfile> {
        let user = self.users.get(&user_id).filter(|u| !u.deleted)?;
        Some(UserProfile {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            avatar_url: user.avatar_url.clone(),
            verified: user.verified,
            follower_count: self.follower_count(user_id),
            following_count: self.following_count(user_id),
        })
    }

    // Mutators - used while loading a snapshot and by tests

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Insert a follow edge; a repeated edge is ignored
    pub fn insert_follow(&mut self, follow: Follow) {
        if !self
            .follow_edges
            .insert((follow.follower_id, follow.followee_id))
        {
            return;
        }
        self.following
            .entry(follow.follower_id)
            .or_default()
            .push(follow);
        self.followers
            .entry(follow.followee_id)
            .or_default()
            .push(follow);
    }

    pub fn insert_block(&mut self, block: Block) {
        self.blocking
            .entry(block.blocker_id)
            .or_default()
            .insert(block.blocked_id);
        self.blocked_by
            .entry(block.blocked_id)
            .or_default()
            .insert(block.blocker_id);
    }

    pub fn insert_interest(&mut self, interest: Interest) {
        self.interests
            .entry(interest.user_id)
            .or_default()
            .push(interest);
        self.category_members
            .entry(interest.category_id)
            .or_default()
            .push(interest);
    }

    pub fn insert_tweet(&mut self, tweet: Tweet) {
        self.user_tweets
            .entry(tweet.author_id)
            .or_default()
            .push(tweet.id);
        self.tweets.insert(tweet.id, tweet);
    }

    pub fn insert_like(&mut self, like: Like) {
        self.user_likes.entry(like.user_id).or_default().push(like);
    }

    /// (users, follow edges, tweets) for logging
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.users.len(), self.follow_edges.len(), self.tweets.len())
    }
}
