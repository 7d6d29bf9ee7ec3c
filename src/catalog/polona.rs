//! Polona digital library catalog.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{CatalogError, CatalogQuery, CatalogSource, KeywordFilters};
use crate::http_client::HttpClient;

/// Polona simple-search endpoint returning up to 4000 hits in one page.
pub const DEFAULT_CATALOG_URL: &str =
    "https://polona.pl/api/search-service/search/simple?query=&page=0&pageSize=4000&sort=RELEVANCE";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Hit {
    #[serde(default)]
    basic_fields: Option<BasicFields>,
}

#[derive(Debug, Default, Deserialize)]
struct BasicFields {
    #[serde(default)]
    title: Option<FieldValues>,
}

#[derive(Debug, Default, Deserialize)]
struct FieldValues {
    #[serde(default)]
    values: Vec<serde_json::Value>,
}

impl Hit {
    fn title(&self) -> Option<&str> {
        self.basic_fields
            .as_ref()?
            .title
            .as_ref()?
            .values
            .first()?
            .as_str()
    }
}

/// Extract trimmed, non-empty titles from a search response body.
///
/// A body without a `hits` field yields no titles.
pub fn parse_titles(body: &str) -> Result<Vec<String>, CatalogError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| CatalogError::Parse(e.to_string()))?;

    let mut titles = Vec::with_capacity(response.hits.len());
    for (index, hit) in response.hits.iter().enumerate() {
        match hit.title().map(str::trim) {
            Some(title) if !title.is_empty() => titles.push(title.to_string()),
            _ => debug!("Skipping catalog hit {} without a title", index),
        }
    }
    Ok(titles)
}

/// Catalog source backed by the Polona search API.
pub struct PolonaCatalog {
    client: HttpClient,
    url: String,
}

impl PolonaCatalog {
    pub fn with_url(client: HttpClient, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl CatalogSource for PolonaCatalog {
    fn name(&self) -> &str {
        "polona"
    }

    async fn fetch_titles(&self, filters: &KeywordFilters) -> Result<Vec<String>, CatalogError> {
        let body = CatalogQuery {
            keyword_filters: filters,
        };
        let response = self.client.post_json(&self.url, &body).await?;
        if !response.is_success() {
            return Err(CatalogError::Status(response.status.as_u16()));
        }

        let text = response.text().await?;
        parse_titles(&text)
    }
}
