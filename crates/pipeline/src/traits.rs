//! Core traits for the eligibility pipeline.
//!
//! This module defines the Filter trait that lets composable filters prune
//! lists of user ids before they are shown to a viewer.

use anyhow::Result;
use social_graph::UserId;
use sources::ViewerContext;

/// Core trait for filtering recommended user ids.
///
/// ## Design Note
/// - `Send + Sync` allows filters to be shared across request tasks
/// - Filters take ownership of the Vec and return the survivors in input order
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a list of user ids.
    ///
    /// # Arguments
    /// * `user_ids` - The ids to filter (takes ownership)
    /// * `context` - The viewer's follow and block sets
    fn apply(&self, user_ids: Vec<UserId>, context: &ViewerContext) -> Result<Vec<UserId>>;
}
