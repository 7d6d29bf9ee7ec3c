//! Search executor.
//!
//! Queries a web search provider through a `PageRenderer` and extracts
//! structured results. Failures are reported as `SearchError` and absorbed
//! by the pipeline as "no results" for that title.

mod engine;
mod query;

pub use engine::{ResultSelectors, SearchEngine};
pub use query::QueryBuilder;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::models::SearchResult;
use crate::render::{PageRenderer, RenderError};

/// Default cap on results parsed per query.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Error type for a single search call. Never fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Render(#[from] RenderError),

    #[error("Search provider returned an empty document")]
    EmptyDocument,

    #[error("Invalid result selector: {0}")]
    Selector(String),
}

/// Runs one free-text query against a search provider.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Search for `query`, optionally restricted upstream to `restrict_domain`.
    async fn search(
        &self,
        query: &str,
        restrict_domain: Option<&str>,
    ) -> Result<Vec<SearchResult>, SearchError>;
}

/// Search executor backed by a results page fetched through a renderer.
pub struct WebSearch {
    engine: SearchEngine,
    base_url: String,
    renderer: Arc<dyn PageRenderer>,
    max_results: usize,
}

impl WebSearch {
    pub fn new(engine: SearchEngine, renderer: Arc<dyn PageRenderer>) -> Self {
        Self {
            engine,
            base_url: engine.default_base_url().to_string(),
            renderer,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Override the provider endpoint.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Build the provider query string.
    pub fn provider_query(query: &str, restrict_domain: Option<&str>) -> String {
        let mut builder = QueryBuilder::new().term(query);
        if let Some(domain) = restrict_domain {
            builder = builder.site(domain);
        }
        builder.build()
    }

    /// Full results-page URL for a provider query.
    pub fn search_url(&self, provider_query: &str) -> String {
        let separator = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}q={}",
            self.base_url,
            separator,
            urlencoding::encode(provider_query)
        )
    }
}

#[async_trait]
impl SearchExecutor for WebSearch {
    async fn search(
        &self,
        query: &str,
        restrict_domain: Option<&str>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let provider_query = Self::provider_query(query, restrict_domain);
        let url = self.search_url(&provider_query);
        debug!(
            "{} search via {}: {}",
            self.engine.name(),
            self.renderer.name(),
            provider_query
        );

        let html = self.renderer.render(&url).await?;
        if html.trim().is_empty() {
            return Err(SearchError::EmptyDocument);
        }

        self.engine.parse_results(&html, self.max_results)
    }
}
