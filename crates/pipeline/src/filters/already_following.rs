//! Filter to remove users the viewer already follows.
//!
//! Uses the HashSet in ViewerContext.following for O(1) lookups.

use crate::traits::Filter;
use anyhow::Result;
use social_graph::UserId;
use sources::ViewerContext;

pub struct AlreadyFollowingFilter;

impl Filter for AlreadyFollowingFilter {
    fn name(&self) -> &str {
        "AlreadyFollowingFilter"
    }

    fn apply(&self, user_ids: Vec<UserId>, context: &ViewerContext) -> Result<Vec<UserId>> {
        Ok(user_ids
            .into_iter()
            .filter(|id| !context.following.contains(id))
            .collect())
    }
}
