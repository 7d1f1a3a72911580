//! Loading a [`SocialGraph`] from a JSON snapshot.
//!
//! A snapshot is a dump of the store tables the recommender reads:
//!
//! ```json
//! {
//!   "users":     [{ "id": 1, "name": "Ada", "username": "ada", "verified": true }],
//!   "follows":   [{ "follower_id": 1, "followee_id": 2, "created_at": 1700000000 }],
//!   "blocks":    [{ "blocker_id": 1, "blocked_id": 3 }],
//!   "interests": [{ "user_id": 1, "category_id": 7, "score": 80.0 }],
//!   "tweets":    [{ "id": 10, "author_id": 2, "in_reply_to": null }],
//!   "likes":     [{ "user_id": 1, "tweet_id": 10 }]
//! }
//! ```
//!
//! Every array is optional. Referential integrity is checked before the
//! graph is built, with the per-table checks running in parallel on rayon.

use crate::error::{GraphError, Result};
use crate::types::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Raw table dump, exactly as it appears on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub follows: Vec<Follow>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub interests: Vec<Interest>,
    #[serde(default)]
    pub tweets: Vec<Tweet>,
    #[serde(default)]
    pub likes: Vec<Like>,
}

impl Snapshot {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GraphError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check referential integrity and value ranges
    pub fn validate(&self) -> Result<()> {
        let mut user_ids = HashSet::with_capacity(self.users.len());
        for user in &self.users {
            if !user_ids.insert(user.id) {
                return Err(GraphError::DuplicateUser(user.id));
            }
        }

        let mut tweet_ids = HashSet::with_capacity(self.tweets.len());
        for tweet in &self.tweets {
            if !tweet_ids.insert(tweet.id) {
                return Err(GraphError::ValidationError(format!(
                    "duplicate tweet id {}",
                    tweet.id
                )));
            }
        }

        let mut declared = HashSet::with_capacity(self.interests.len());
        for interest in &self.interests {
            if !declared.insert((interest.user_id, interest.category_id)) {
                return Err(GraphError::ValidationError(format!(
                    "user {} declares interest in category {} more than once",
                    interest.user_id, interest.category_id
                )));
            }
        }

        let known_user = |entity: &'static str, id: UserId| {
            if user_ids.contains(&id) {
                Ok(())
            } else {
                Err(GraphError::MissingUser { entity, id })
            }
        };
        let known_tweet = |entity: &'static str, id: TweetId| {
            if tweet_ids.contains(&id) {
                Ok(())
            } else {
                Err(GraphError::MissingTweet { entity, id })
            }
        };

        let follows = self.follows.par_iter().find_map_any(|f| {
            if f.follower_id == f.followee_id {
                return Some(GraphError::ValidationError(format!(
                    "user {} follows themselves",
                    f.follower_id
                )));
            }
            known_user("follow", f.follower_id)
                .and_then(|_| known_user("follow", f.followee_id))
                .err()
        });

        let blocks = self.blocks.par_iter().find_map_any(|b| {
            if b.blocker_id == b.blocked_id {
                return Some(GraphError::ValidationError(format!(
                    "user {} blocks themselves",
                    b.blocker_id
                )));
            }
            known_user("block", b.blocker_id)
                .and_then(|_| known_user("block", b.blocked_id))
                .err()
        });

        let interests = self.interests.par_iter().find_map_any(|i| {
            if !(0.0..=100.0).contains(&i.score) {
                return Some(GraphError::ValidationError(format!(
                    "interest score {} for user {} is outside 0..=100",
                    i.score, i.user_id
                )));
            }
            known_user("interest", i.user_id).err()
        });

        let tweets = self.tweets.par_iter().find_map_any(|t| {
            known_user("tweet", t.author_id)
                .and_then(|_| match t.in_reply_to {
                    Some(parent) => known_tweet("reply", parent),
                    None => Ok(()),
                })
                .err()
        });

        let likes = self.likes.par_iter().find_map_any(|l| {
            known_user("like", l.user_id)
                .and_then(|_| known_tweet("like", l.tweet_id))
                .err()
        });

        match [follows, blocks, interests, tweets, likes]
            .into_iter()
            .flatten()
            .next()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Validate and index the snapshot
    pub fn into_graph(self) -> Result<SocialGraph> {
        self.validate()?;

        let mut graph = SocialGraph::new();
        for user in self.users {
            graph.insert_user(user);
        }
        for follow in self.follows {
            graph.insert_follow(follow);
        }
        for block in self.blocks {
            graph.insert_block(block);
        }
        for interest in self.interests {
            graph.insert_interest(interest);
        }
        for tweet in self.tweets {
            graph.insert_tweet(tweet);
        }
        for like in self.likes {
            graph.insert_like(like);
        }
        Ok(graph)
    }
}

impl SocialGraph {
    /// Load and validate a graph from a JSON snapshot file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Snapshot::read(path)?.into_graph()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Snapshot::from_json_str(json)?.into_graph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "users": [
            { "id": 1, "name": "Ada", "username": "ada", "verified": true },
            { "id": 2, "name": "Brian", "username": "brian" },
            { "id": 3, "name": "Cleo", "username": "cleo", "deleted": true }
        ],
        "follows": [
            { "follower_id": 1, "followee_id": 2, "created_at": 100 },
            { "follower_id": 2, "followee_id": 1, "created_at": 200 }
        ],
        "blocks": [{ "blocker_id": 3, "blocked_id": 1 }],
        "interests": [{ "user_id": 1, "category_id": 4, "score": 75.0 }],
        "tweets": [
            { "id": 10, "author_id": 2 },
            { "id": 11, "author_id": 1, "in_reply_to": 10 }
        ],
        "likes": [{ "user_id": 1, "tweet_id": 10, "created_at": 300 }]
    }"#;

    #[test]
    fn test_load_sample_snapshot() {
        let graph = SocialGraph::from_json_str(SAMPLE).unwrap();

        assert_eq!(graph.counts(), (3, 2, 2));
        assert!(graph.is_following(1, 2));
        assert!(graph.is_following(2, 1));
        assert!(graph.is_blocked_either_way(1, 3));
        assert_eq!(graph.interests_of(1).len(), 1);
        assert_eq!(graph.likes_by(1).len(), 1);
        assert_eq!(graph.get_tweet(11).unwrap().in_reply_to, Some(10));
    }

    #[test]
    fn test_missing_arrays_default_to_empty() {
        let graph = SocialGraph::from_json_str(r#"{ "users": [] }"#).unwrap();
        assert_eq!(graph.counts(), (0, 0, 0));
    }

    #[test]
    fn test_rejects_follow_of_unknown_user() {
        let json = r#"{
            "users": [{ "id": 1, "name": "Ada", "username": "ada" }],
            "follows": [{ "follower_id": 1, "followee_id": 99 }]
        }"#;
        let err = SocialGraph::from_json_str(json).unwrap_err();
        assert!(matches!(err, GraphError::MissingUser { id: 99, .. }));
    }

    #[test]
    fn test_rejects_like_of_unknown_tweet() {
        let json = r#"{
            "users": [{ "id": 1, "name": "Ada", "username": "ada" }],
            "likes": [{ "user_id": 1, "tweet_id": 5 }]
        }"#;
        let err = SocialGraph::from_json_str(json).unwrap_err();
        assert!(matches!(err, GraphError::MissingTweet { id: 5, .. }));
    }

    #[test]
    fn test_rejects_out_of_range_interest_score() {
        let json = r#"{
            "users": [{ "id": 1, "name": "Ada", "username": "ada" }],
            "interests": [{ "user_id": 1, "category_id": 2, "score": 140.0 }]
        }"#;
        let err = SocialGraph::from_json_str(json).unwrap_err();
        assert!(matches!(err, GraphError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_repeated_interest_category() {
        let json = r#"{
            "users": [{ "id": 1, "name": "Ada", "username": "ada" }],
            "interests": [
                { "user_id": 1, "category_id": 7, "score": 40.0 },
                { "user_id": 1, "category_id": 7, "score": 60.0 }
            ]
        }"#;
        let err = SocialGraph::from_json_str(json).unwrap_err();
        assert!(matches!(err, GraphError::ValidationError(_)));
    }

    #[test]
    fn test_rejects_self_follow_and_duplicate_users() {
        let self_follow = r#"{
            "users": [{ "id": 1, "name": "Ada", "username": "ada" }],
            "follows": [{ "follower_id": 1, "followee_id": 1 }]
        }"#;
        assert!(SocialGraph::from_json_str(self_follow).is_err());

        let duplicate = r#"{
            "users": [
                { "id": 1, "name": "Ada", "username": "ada" },
                { "id": 1, "name": "Ada again", "username": "ada2" }
            ]
        }"#;
        let err = SocialGraph::from_json_str(duplicate).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateUser(1)));
    }

    #[test]
    fn test_missing_file() {
        let err = SocialGraph::load_from_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, GraphError::FileNotFound { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = SocialGraph::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, GraphError::ParseError(_)));
    }
}
