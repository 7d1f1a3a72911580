//! # Recommendation Engine
//!
//! Coordinates a "Who to Follow" request end to end:
//! 1. Load the requester's follow and block sets
//! 2. Run the five candidate source queries concurrently
//! 3. Blend them with per-source quotas into one ranked list
//! 4. Re-check eligibility of the blended ids
//! 5. Backfill from popularity if the list is short
//! 6. Hydrate the final ids into display rows
//!
//! Anonymous requests skip straight to popularity.
//!
//! ## Failure handling
//! A failing source is logged and contributes nothing; its siblings are
//! unaffected. Only when every queried source fails and the store reports
//! itself unreachable does the request fail. An unreachable store on the
//! viewer-context or anonymous popularity query fails the same way. Running
//! short of candidates is never an error.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use pipeline::filters::AlreadySelectedFilter;
use pipeline::{BlendStats, FilterPipeline, QuotaBlender, RecommendationConfig};
use social_graph::UserId;
use sources::{Candidate, SocialStore, Source, StoreError, ViewerContext};

use crate::error::{EngineError, Result};
use crate::hydrator::{ProfileHydrator, UserListItem};

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "source")]
pub enum Origin {
    /// Admitted by the blender from this source
    Personalized(Source),
    /// Popularity fallback
    Popular,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub user_id: UserId,
    /// Normalized 0-100 score; `None` for popularity fallback
    pub score: Option<f32>,
    pub origin: Origin,
}

/// Ranked recommendations for one request
#[derive(Debug, Clone, Default)]
pub struct RecommendationSet {
    /// Unique by user id, at most `limit` long
    pub entries: Vec<Recommendation>,
    /// Blend statistics; `None` for anonymous requests
    pub stats: Option<BlendStats>,
}

impl RecommendationSet {
    pub fn user_ids(&self) -> Vec<UserId> {
        self.entries.iter().map(|e| e.user_id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries admitted by popularity fallback
    pub fn backfilled(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.origin == Origin::Popular)
            .count()
    }
}

/// Main engine; cheap to clone and safe to share across request tasks
#[derive(Clone)]
pub struct RecommendationEngine {
    store: Arc<dyn SocialStore>,
    config: Arc<RecommendationConfig>,
    blender: QuotaBlender,
    eligibility: Arc<FilterPipeline>,
    hydrator: ProfileHydrator,
}

impl RecommendationEngine {
    /// Create a new engine over `store`
    ///
    /// # Arguments
    /// * `store` - Query interface for the social graph
    /// * `config` - Thresholds, quota distribution and over-fetch multipliers
    pub fn new(store: Arc<dyn SocialStore>, config: RecommendationConfig) -> Self {
        let blender = QuotaBlender::from_config(&config);
        let hydrator = ProfileHydrator::new(Arc::clone(&store));
        Self {
            store,
            config: Arc::new(config),
            blender,
            eligibility: Arc::new(FilterPipeline::eligibility()),
            hydrator,
        }
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Main entry point: ranked, hydrated "Who to Follow" rows
    ///
    /// # Arguments
    /// * `requester` - The viewer, or `None` for an anonymous request
    /// * `limit` - Maximum number of rows to return
    pub async fn get_who_to_follow(
        &self,
        requester: Option<UserId>,
        limit: usize,
    ) -> Result<Vec<UserListItem>> {
        let set = self.recommend(requester, limit).await?;
        self.hydrate(&set, requester).await
    }

    /// Hydrate a recommendation set in rank order
    pub async fn hydrate(
        &self,
        set: &RecommendationSet,
        viewer: Option<UserId>,
    ) -> Result<Vec<UserListItem>> {
        Ok(self.hydrator.hydrate(&set.user_ids(), viewer).await?)
    }

    /// Rank recommendations without hydrating them
    #[instrument(skip(self))]
    pub async fn recommend(
        &self,
        requester: Option<UserId>,
        limit: usize,
    ) -> Result<RecommendationSet> {
        let start_time = Instant::now();

        if limit == 0 {
            return Ok(RecommendationSet::default());
        }

        let Some(requester) = requester else {
            let popular = self
                .store
                .popular_users(limit)
                .await
                .map_err(EngineError::from_store)?;
            info!("Served {} popular users to anonymous request", popular.len());
            return Ok(RecommendationSet {
                entries: popular.into_iter().map(popular_entry).collect(),
                stats: None,
            });
        };

        let context = self
            .store
            .viewer_context(requester)
            .await
            .map_err(EngineError::from_store)?;
        debug!(
            "Viewer context: following={}, blocked={}",
            context.following.len(),
            context.blocked.len()
        );

        let candidates = self.fetch_candidates(requester, limit).await?;
        info!("Fetched {} candidates from all sources", candidates.len());

        let outcome = self.blender.blend(candidates, limit);
        log_blend_stats(&outcome.stats);

        let eligible: HashSet<UserId> = self
            .eligibility
            .apply(outcome.user_ids(), &context)?
            .into_iter()
            .collect();
        let mut entries: Vec<Recommendation> = outcome
            .candidates
            .into_iter()
            .filter(|c| eligible.contains(&c.user_id))
            .map(|c| Recommendation {
                user_id: c.user_id,
                score: Some(c.score),
                origin: Origin::Personalized(c.source),
            })
            .collect();

        if entries.len() < limit {
            let backfill = self.backfill(&context, &entries, limit).await?;
            info!(
                "Backfilled {} popular users ({} personalized)",
                backfill.len(),
                entries.len()
            );
            entries.extend(backfill.into_iter().map(popular_entry));
        }

        info!(
            "Recommended {} users for {} in {:.2?}",
            entries.len(),
            requester,
            start_time.elapsed()
        );

        Ok(RecommendationSet {
            entries,
            stats: Some(outcome.stats),
        })
    }

    /// Run every source with a non-zero fetch size and collect what succeeds
    async fn fetch_candidates(&self, requester: UserId, limit: usize) -> Result<Vec<Candidate>> {
        let queried: Vec<(Source, usize)> = Source::PRIORITY
            .into_iter()
            .map(|source| (source, self.config.fetch_limit(source, limit)))
            .filter(|&(_, fetch)| fetch > 0)
            .collect();

        let handles = queried.iter().map(|&(source, fetch)| {
            let store = Arc::clone(&self.store);
            tokio::spawn(async move { store.fetch_candidates(source, requester, fetch).await })
        });
        let results = join_all(handles).await;

        let mut candidates = Vec::new();
        let mut failures: Vec<StoreError> = Vec::new();
        for (&(source, fetch), result) in queried.iter().zip(results) {
            match result {
                Ok(Ok(batch)) => {
                    debug!("Source {} returned {}/{} candidates", source, batch.len(), fetch);
                    candidates.extend(batch);
                }
                Ok(Err(err)) => {
                    warn!("Source {} failed, treating as empty: {}", source, err);
                    failures.push(err);
                }
                Err(join_err) => {
                    error!("Source {} task panicked, treating as empty: {}", source, join_err);
                    failures.push(StoreError::Task(join_err.to_string()));
                }
            }
        }

        if !queried.is_empty() && failures.len() == queried.len() {
            if let Some(err) = failures
                .into_iter()
                .find(|err| matches!(err, StoreError::Unavailable(_)))
            {
                return Err(EngineError::StoreUnavailable(err));
            }
        }

        Ok(candidates)
    }

    /// Popular users the viewer may see, excluding `present`.
    ///
    /// Over-fetches by the fallback multiplier and keeps doubling the fetch
    /// until enough survive the filters or the store runs out of users.
    async fn backfill(
        &self,
        context: &ViewerContext,
        present: &[Recommendation],
        limit: usize,
    ) -> Result<Vec<UserId>> {
        let missing = limit - present.len();
        let filters = FilterPipeline::eligibility()
            .add_filter(AlreadySelectedFilter::new(present.iter().map(|e| e.user_id)));

        let mut fetch = limit.saturating_mul(self.config.fallback_overfetch_multiplier);
        loop {
            let popular = self.store.popular_users(fetch).await?;
            let exhausted = popular.len() < fetch;
            let mut eligible = filters.apply(popular, context)?;

            if eligible.len() >= missing || exhausted {
                eligible.truncate(missing);
                return Ok(eligible);
            }
            debug!(
                "Backfill short ({}/{}) at fetch size {}, retrying",
                eligible.len(),
                missing,
                fetch
            );
            fetch = fetch.saturating_mul(2);
        }
    }
}

fn popular_entry(user_id: UserId) -> Recommendation {
    Recommendation {
        user_id,
        score: None,
        origin: Origin::Popular,
    }
}

fn log_blend_stats(stats: &BlendStats) {
    for source in &stats.sources {
        debug!(
            "Blend {}: quota={}, available={}, selected={}, duplicates={}",
            source.source, source.quota, source.available, source.selected, source.duplicates
        );
    }
    info!(
        "Blend: {} by quota, {} backfilled, {} truncated",
        stats.selected_by_quota(),
        stats.backfilled,
        stats.truncated
    );
}
