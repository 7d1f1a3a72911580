//! Filter that removes the viewer themselves.

use crate::traits::Filter;
use anyhow::Result;
use social_graph::UserId;
use sources::ViewerContext;

pub struct SelfFilter;

impl Filter for SelfFilter {
    fn name(&self) -> &str {
        "SelfFilter"
    }

    fn apply(&self, user_ids: Vec<UserId>, context: &ViewerContext) -> Result<Vec<UserId>> {
        Ok(user_ids
            .into_iter()
            .filter(|&id| id != context.user_id)
            .collect())
    }
}
