//! The FilterPipeline orchestrates multiple filters.
//!
//! Filters are chained with the builder pattern and applied in insertion
//! order.

use crate::filters::{AlreadyFollowingFilter, BlockedFilter, SelfFilter};
use crate::traits::Filter;
use anyhow::Result;
use social_graph::UserId;
use sources::ViewerContext;
use tracing;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(SelfFilter)
///     .add_filter(AlreadyFollowingFilter)
///     .add_filter(AlreadySelectedFilter::new(existing_ids));
///
/// let eligible = pipeline.apply(popular_ids, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// The standard viewer rules: never yourself, never someone you follow,
    /// never someone on either side of a block.
    pub fn eligibility() -> Self {
        Self::new()
            .add_filter(SelfFilter)
            .add_filter(AlreadyFollowingFilter)
            .add_filter(BlockedFilter)
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the ids.
    pub fn apply(&self, user_ids: Vec<UserId>, context: &ViewerContext) -> Result<Vec<UserId>> {
        let mut current = user_ids;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter applied: {} ({} -> {})",
                filter.name(),
                before,
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
