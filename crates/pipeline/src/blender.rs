//! Weighted-quota blending across candidate sources.
//!
//! ## Algorithm
//! 1. Score every candidate with the [`ScoreNormalizer`]
//! 2. Partition by source, keeping each source's own order
//! 3. Give each source a quota of `ceil(limit * share / 100)`
//! 4. Walk sources in priority order taking up to quota each; an id already
//!    taken by an earlier source is skipped, and no later quota grows to
//!    make up for it
//! 5. If still short of `limit`, rank everything left over by score and
//!    append unseen ids
//! 6. Re-sort by score and truncate to `limit`
//!
//! The blender is a pure function of its inputs. Distribution counts are
//! returned in [`BlendStats`] for the caller to log.

use crate::config::{Distribution, RecommendationConfig};
use crate::normalizer::{rank_order, ScoreNormalizer, ScoredCandidate};
use social_graph::UserId;
use sources::{Candidate, Source};
use std::collections::{HashMap, HashSet};

/// How one source fared during the quota pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStats {
    pub source: Source,
    pub quota: usize,
    /// Candidates the source supplied
    pub available: usize,
    /// Candidates admitted through the quota pass
    pub selected: usize,
    /// Candidates skipped because an earlier source already took them
    pub duplicates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlendStats {
    /// One entry per source, in priority order
    pub sources: Vec<SourceStats>,
    /// Candidates admitted by the global backfill pass
    pub backfilled: usize,
    /// Candidates dropped by the final truncation
    pub truncated: usize,
}

impl BlendStats {
    pub fn for_source(&self, source: Source) -> Option<&SourceStats> {
        self.sources.iter().find(|s| s.source == source)
    }

    /// Total admitted by quota, before backfill
    pub fn selected_by_quota(&self) -> usize {
        self.sources.iter().map(|s| s.selected).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlendOutcome {
    /// Unique by user id, best first, at most `limit` long
    pub candidates: Vec<ScoredCandidate>,
    pub stats: BlendStats,
}

impl BlendOutcome {
    pub fn user_ids(&self) -> Vec<UserId> {
        self.candidates.iter().map(|c| c.user_id).collect()
    }
}

#[derive(Debug, Clone)]
pub struct QuotaBlender {
    normalizer: ScoreNormalizer,
    distribution: Distribution,
}

impl QuotaBlender {
    pub fn new(normalizer: ScoreNormalizer, distribution: Distribution) -> Self {
        Self {
            normalizer,
            distribution,
        }
    }

    pub fn from_config(config: &RecommendationConfig) -> Self {
        Self::new(
            ScoreNormalizer::new(config.thresholds.clone()),
            config.distribution.clone(),
        )
    }

    /// Blend candidates from any mix of sources into at most `limit` unique users
    pub fn blend(&self, candidates: Vec<Candidate>, limit: usize) -> BlendOutcome {
        let total = candidates.len();
        let mut partitions: HashMap<Source, Vec<ScoredCandidate>> = HashMap::new();
        for candidate in candidates {
            let scored = self.normalizer.score_candidate(candidate);
            partitions.entry(scored.source).or_default().push(scored);
        }

        let mut stats = BlendStats::default();
        let mut selected: Vec<ScoredCandidate> = Vec::with_capacity(limit.min(total));
        let mut seen: HashSet<UserId> = HashSet::new();
        let mut leftovers: Vec<ScoredCandidate> = Vec::new();

        // Quota pass
        for source in Source::PRIORITY {
            let partition = partitions.remove(&source).unwrap_or_default();
            let mut source_stats = SourceStats {
                source,
                quota: self.distribution.quota(source, limit),
                available: partition.len(),
                selected: 0,
                duplicates: 0,
            };

            for candidate in partition {
                if seen.contains(&candidate.user_id) {
                    source_stats.duplicates += 1;
                } else if source_stats.selected < source_stats.quota {
                    seen.insert(candidate.user_id);
                    selected.push(candidate);
                    source_stats.selected += 1;
                } else {
                    leftovers.push(candidate);
                }
            }
            stats.sources.push(source_stats);
        }

        // Global backfill from whatever the quotas left behind
        if selected.len() < limit {
            leftovers.sort_by(rank_order);
            for candidate in leftovers {
                if selected.len() >= limit {
                    break;
                }
                if seen.insert(candidate.user_id) {
                    selected.push(candidate);
                    stats.backfilled += 1;
                }
            }
        }

        selected.sort_by(rank_order);
        stats.truncated = selected.len().saturating_sub(limit);
        selected.truncate(limit);

        BlendOutcome {
            candidates: selected,
            stats,
        }
    }
}
