//! Shared-interests Source
//!
//! Finds users who declared interest in the same categories as the requester.
//! Each candidate carries the number of categories in common and the average
//! of the candidate's own interest scores across those categories. Users with
//! no overlap never appear.

use crate::traits::CandidateGenerator;
use crate::types::{Candidate, Signal, Source, ViewerContext};
use crate::viewer_context::is_eligible;
use social_graph::{CategoryId, SocialGraph, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Clone)]
pub struct SharedInterestsSource {
    graph: Arc<SocialGraph>,
}

/// Running (categories in common, sum of candidate scores)
type Overlap = (u32, f32);

impl SharedInterestsSource {
    pub fn new(graph: Arc<SocialGraph>) -> Self {
        Self { graph }
    }

    fn collect_overlaps(&self, context: &ViewerContext) -> HashMap<UserId, Overlap> {
        let categories: HashSet<CategoryId> = self
            .graph
            .interests_of(context.user_id)
            .iter()
            .map(|interest| interest.category_id)
            .collect();

        let mut overlaps: HashMap<UserId, Overlap> = HashMap::new();
        for category_id in categories {
            // A repeated (user, category) row still counts once
            let mut counted: HashSet<UserId> = HashSet::new();
            for member in self.graph.category_members(category_id) {
                if !counted.insert(member.user_id)
                    || !is_eligible(&self.graph, context, member.user_id)
                {
                    continue;
                }
                let entry = overlaps.entry(member.user_id).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += member.score;
            }
        }
        overlaps
    }
}

impl CandidateGenerator for SharedInterestsSource {
    fn source(&self) -> Source {
        Source::Interests
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn get_candidates(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .collect_overlaps(context)
            .into_iter()
            .filter(|(_, (common, _))| *common > 0)
            .map(|(user_id, (common, score_sum))| {
                Candidate::new(
                    user_id,
                    Source::Interests,
                    Signal::SharedInterests {
                        common_categories: common,
                        avg_interest_score: score_sum / common as f32,
                    },
                )
            })
            .collect();

        candidates.sort_by(|a, b| {
            let (a_common, a_avg) = overlap_of(a);
            let (b_common, b_avg) = overlap_of(b);
            b_common
                .cmp(&a_common)
                .then(b_avg.total_cmp(&a_avg))
                .then(a.user_id.cmp(&b.user_id))
        });
        candidates.truncate(limit);

        debug!("Generated {} shared-interest candidates", candidates.len());
        candidates
    }
}

fn overlap_of(candidate: &Candidate) -> (u32, f32) {
    match candidate.signal {
        Signal::SharedInterests {
            common_categories,
            avg_interest_score,
        } => (common_categories, avg_interest_score),
        _ => (0, 0.0),
    }
}
