//! Filter to remove users on either side of a block with the viewer.

use crate::traits::Filter;
use anyhow::Result;
use social_graph::UserId;
use sources::ViewerContext;

pub struct BlockedFilter;

impl Filter for BlockedFilter {
    fn name(&self) -> &str {
        "BlockedFilter"
    }

    fn apply(&self, user_ids: Vec<UserId>, context: &ViewerContext) -> Result<Vec<UserId>> {
        Ok(user_ids
            .into_iter()
            .filter(|id| !context.blocked.contains(id))
            .collect())
    }
}
