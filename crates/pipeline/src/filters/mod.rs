//! Filter implementations for the eligibility pipeline.
//!
//! Candidate queries already apply these rules; the filters re-apply them
//! to anything that did not come through a query, such as popularity
//! backfill.

pub mod already_following;
pub mod already_selected;
pub mod blocked;
pub mod self_recommendation;

// Re-export for convenience
pub use already_following::AlreadyFollowingFilter;
pub use already_selected::AlreadySelectedFilter;
pub use blocked::BlockedFilter;
pub use self_recommendation::SelfFilter;
