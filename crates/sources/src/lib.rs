//! # Sources Crate
//!
//! Candidate generation for "Who to Follow".
//!
//! ## Components
//!
//! ### Personalized sources
//! Five independent strategies, each a [`CandidateGenerator`]:
//! - **Friends-of-friends**: followed by people you follow
//! - **Shared interests**: declared interest in the same categories
//! - **Liked authors**: wrote tweets you liked
//! - **Replied authors**: wrote tweets you replied to
//! - **Followers not followed back**: follow you, you don't follow them
//!
//! Every generator excludes the requester, accounts they already follow,
//! accounts on either side of a block, and soft-deleted accounts.
//!
//! ### Popularity
//! [`PopularitySource`] ranks active users verified-first, then by
//! follower count. It serves anonymous requests and backfill.
//!
//! ### Store
//! [`SocialStore`] is the async query interface the engine consumes;
//! [`GraphStore`] implements it over the in-memory graph.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{GraphStore, SocialStore, Source};
//! use social_graph::SocialGraph;
//! use std::sync::Arc;
//!
//! let graph = Arc::new(SocialGraph::load_from_file("data/demo-graph.json".as_ref())?);
//! let store = GraphStore::new(graph);
//!
//! let candidates = store.fetch_candidates(Source::FriendsOfFriends, 1, 12).await?;
//! let popular = store.popular_users(10).await?;
//! ```

pub mod friends_of_friends;
pub mod interactions;
pub mod popularity;
pub mod reciprocity;
pub mod shared_interests;
pub mod store;
pub mod traits;
pub mod types;
pub mod viewer_context;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use friends_of_friends::FriendsOfFriendsSource;
pub use interactions::{LikedAuthorsSource, RepliedAuthorsSource};
pub use popularity::PopularitySource;
pub use reciprocity::FollowersNotFollowedSource;
pub use shared_interests::SharedInterestsSource;
pub use store::{GraphStore, SocialStore, StoreError};
pub use traits::CandidateGenerator;
pub use types::{Candidate, Signal, Source, ViewerContext};
