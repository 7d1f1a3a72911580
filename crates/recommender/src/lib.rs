//! Recommender crate for the "Who to Follow" engine.
//!
//! This crate contains the engine that coordinates candidate sources,
//! blending, popularity backfill and profile hydration.

pub mod engine;
pub mod error;
pub mod hydrator;

pub use engine::{Origin, Recommendation, RecommendationEngine, RecommendationSet};
pub use error::{EngineError, Result};
pub use hydrator::{ProfileHydrator, UserListItem};
