//! Result persistence.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::info;

use crate::models::MatchRecord;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "gov_pl_results.json";

/// Error type for writing results.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for the records of one run.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Write every record, replacing any previous output.
    async fn persist(&self, records: &[MatchRecord]) -> Result<(), PersistenceError>;

    /// Human-readable destination for log lines.
    fn describe(&self) -> String;
}

/// Writes records as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Serialize into a temp file next to the target, then rename over it.
    fn write_atomic(&self, json: &[u8]) -> Result<(), PersistenceError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(json).map_err(|e| self.io_error(e))?;
        tmp.flush().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl ResultSink for JsonFileSink {
    async fn persist(&self, records: &[MatchRecord]) -> Result<(), PersistenceError> {
        let mut json = serde_json::to_vec_pretty(records)?;
        json.push(b'\n');

        let sink = self.clone();
        tokio::task::spawn_blocking(move || sink.write_atomic(&json))
            .await
            .map_err(|e| self.io_error(std::io::Error::other(e)))??;

        info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
