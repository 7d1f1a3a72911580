//! Filter to remove ids that are already in the result.
//!
//! Also drops repeats within the input, keeping the first occurrence.

use crate::traits::Filter;
use anyhow::Result;
use social_graph::UserId;
use sources::ViewerContext;
use std::collections::HashSet;

pub struct AlreadySelectedFilter {
    selected: HashSet<UserId>,
}

impl AlreadySelectedFilter {
    pub fn new(selected: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            selected: selected.into_iter().collect(),
        }
    }
}

impl Filter for AlreadySelectedFilter {
    fn name(&self) -> &str {
        "AlreadySelectedFilter"
    }

    fn apply(&self, user_ids: Vec<UserId>, _context: &ViewerContext) -> Result<Vec<UserId>> {
        let mut seen = self.selected.clone();
        Ok(user_ids.into_iter().filter(|&id| seen.insert(id)).collect())
    }
}
