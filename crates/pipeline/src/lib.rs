//! Scoring, blending and eligibility filtering for "Who to Follow".
//!
//! This crate provides:
//! - `RecommendationConfig` with per-source thresholds and the quota distribution
//! - `ScoreNormalizer` mapping each source's raw signal onto 0-100
//! - `QuotaBlender` merging candidates from all sources into one ranked list
//! - Filter trait and implementations for viewer eligibility
//! - FilterPipeline for composing filters
//!
//! ## Architecture
//! Candidates flow through the stages in order:
//! 1. The normalizer scores each candidate
//! 2. The blender applies per-source quotas, deduplicates, backfills and truncates
//! 3. Filters guard anything added after the blend (popularity backfill)
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{FilterPipeline, QuotaBlender, RecommendationConfig};
//! use pipeline::filters::*;
//!
//! let config = RecommendationConfig::load(None)?;
//! let blender = QuotaBlender::from_config(&config);
//! let outcome = blender.blend(candidates, 10);
//!
//! let pipeline = FilterPipeline::eligibility()
//!     .add_filter(AlreadySelectedFilter::new(outcome.user_ids()));
//! let backfill = pipeline.apply(popular_ids, &context)?;
//! ```

pub mod blender;
pub mod config;
pub mod filter_pipeline;
pub mod filters;
pub mod normalizer;
pub mod traits;

// Re-export main types
pub use blender::{BlendOutcome, BlendStats, QuotaBlender, SourceStats};
pub use config::{ConfigError, Distribution, RecommendationConfig, ScoreThresholds};
pub use filter_pipeline::FilterPipeline;
pub use normalizer::{rank_order, ScoreNormalizer, ScoredCandidate, MAX_SCORE};
pub use traits::Filter;
