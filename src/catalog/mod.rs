//! Seed loading from a bibliographic catalog.

mod polona;

pub use polona::{parse_titles, PolonaCatalog, DEFAULT_CATALOG_URL};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::PipelineError;
use crate::retry::{retry, RetryPolicy};

/// Error type for catalog fetches.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned status {0}")]
    Status(u16),

    #[error("Invalid catalog response: {0}")]
    Parse(String),
}

/// Keyword facets sent with the catalog query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFilters {
    pub copyright: Vec<String>,
    pub keywords: Vec<String>,
    pub category: Vec<String>,
    pub language: Vec<String>,
}

impl Default for KeywordFilters {
    /// Public-domain Polish-language history books.
    fn default() -> Self {
        Self {
            copyright: vec!["false".to_string()],
            keywords: vec!["Historia".to_string()],
            category: vec!["Książki".to_string()],
            language: vec!["polski".to_string()],
        }
    }
}

/// Request body wrapping the keyword filters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery<'a> {
    pub keyword_filters: &'a KeywordFilters,
}

/// A source of document titles.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch titles matching `filters`. Empty titles are already dropped.
    async fn fetch_titles(&self, filters: &KeywordFilters) -> Result<Vec<String>, CatalogError>;
}

/// Fetch seed titles under the retry policy.
///
/// Exhausting every attempt is fatal for the run.
pub async fn load_seeds(
    source: &dyn CatalogSource,
    filters: &KeywordFilters,
    policy: &RetryPolicy,
) -> Result<Vec<String>, PipelineError> {
    let label = format!("{} catalog fetch", source.name());
    let titles = retry(policy, &label, || source.fetch_titles(filters))
        .await
        .map_err(|err| PipelineError::SourceUnavailable {
            attempts: policy.attempts,
            source: err,
        })?;

    info!("Loaded {} titles from {}", titles.len(), source.name());
    Ok(titles)
}
