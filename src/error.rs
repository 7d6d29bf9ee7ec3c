//! Run-level error types.
//!
//! Only failures that leave the pipeline with no work to do (seed loading)
//! or no way to record its work (persistence) surface here. Per-title
//! failures are absorbed where they happen.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::sink::PersistenceError;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Catalog source unavailable after {attempts} attempt(s): {source}")]
    SourceUnavailable {
        attempts: u32,
        #[source]
        source: CatalogError,
    },

    #[error("Failed to persist results: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
