//! # Social Graph Crate
//!
//! In-memory stand-in for the relational store behind the "Who to Follow"
//! recommender: users, follow and block edges, interest scores, tweets and
//! likes, indexed for the lookups the candidate queries perform.
//!
//! ## Main Components
//!
//! - **types**: store records (`User`, `Follow`, `Block`, ...) and the `SocialGraph` index
//! - **snapshot**: load and validate a graph from a JSON table dump
//! - **error**: `GraphError` and the crate `Result` alias
//!
//! ## Example Usage
//!
//! ```ignore
//! use social_graph::SocialGraph;
//! use std::path::Path;
//!
//! let graph = SocialGraph::load_from_file(Path::new("data/demo-graph.json"))?;
//! let profile = graph.profile(1).unwrap();
//! println!("{} has {} followers", profile.username, profile.follower_count);
//! ```

pub mod error;
pub mod snapshot;
pub mod types;

pub use error::{GraphError, Result};
pub use snapshot::Snapshot;
pub use types::{
    // Type aliases
    CategoryId,
    Timestamp,
    TweetId,
    UserId,
    // Records
    Block,
    Follow,
    Interest,
    Like,
    Tweet,
    User,
    // Read models
    SocialGraph,
    UserProfile,
};
