use sources::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// Every candidate query failed and the store itself is unreachable
    #[error("social store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("eligibility filter failed: {0}")]
    Filter(#[from] anyhow::Error),
}

impl EngineError {
    /// An unreachable store is fatal; any other store failure is a plain `Store` error
    pub fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => EngineError::StoreUnavailable(err),
            other => EngineError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
