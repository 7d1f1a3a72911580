//! The trait every personalized candidate source implements.

use crate::types::{Candidate, Source, ViewerContext};

/// Produces candidates for one [`Source`].
///
/// Implementations are read-only over shared data, so `Send + Sync` lets
/// the store run them on the blocking pool concurrently.
pub trait CandidateGenerator: Send + Sync {
    /// The source tag stamped on every candidate this generator returns
    fn source(&self) -> Source;

    /// Return at most `limit` candidates, strongest raw signal first.
    ///
    /// Candidates never include anything `context` excludes.
    fn get_candidates(&self, context: &ViewerContext, limit: usize) -> Vec<Candidate>;
}
