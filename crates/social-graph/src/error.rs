//! Error types for the social-graph crate.
//!
//! Everything that can go wrong while loading a snapshot or querying the
//! in-memory graph is funnelled through [`GraphError`].

use thiserror::Error;

use crate::types::{TweetId, UserId};

/// Errors raised while loading, validating, or querying the social graph
#[derive(Error, Debug)]
pub enum GraphError {
    /// Snapshot file could not be found or opened
    #[error("Failed to open snapshot: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading the snapshot
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Snapshot was not valid JSON or did not match the expected shape
    #[error("Malformed snapshot: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A record points at a user that does not exist
    #[error("Missing reference: {entity} points at unknown user {id}")]
    MissingUser { entity: &'static str, id: UserId },

    /// A like or reply points at a tweet that does not exist
    #[error("Missing reference: {entity} points at unknown tweet {id}")]
    MissingTweet { entity: &'static str, id: TweetId },

    /// The same user id appears twice in the snapshot
    #[error("Duplicate user id {0}")]
    DuplicateUser(UserId),

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Lookup for a user that is not in the graph
    #[error("User {0} not found")]
    UserNotFound(UserId),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, GraphError>;
