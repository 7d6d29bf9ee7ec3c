//! Page renderers: turn a URL into markup.
//!
//! Two strategies sit behind one trait. `StaticRenderer` issues a plain HTTP
//! request; `BrowserRenderer` drives a headless Chrome session and returns
//! the DOM after scripts ran.

mod browser;

pub use browser::{BrowserRenderConfig, BrowserRenderer};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::http_client::{is_html_content_type, HttpClient};

/// Error type for render operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url} but got {content_type}")]
    NotHtml { url: String, content_type: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation timed out after {0}s")]
    Timeout(u64),

    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    BrowserUnavailable,
}

/// Which renderer fetches search pages and verification pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RenderStrategy {
    /// Plain HTTP fetch, markup parsed statically.
    #[default]
    Static,
    /// Headless browser session, markup taken after script execution.
    Browser,
}

/// Something that can turn a URL into HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetch `url` and return its markup.
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

/// Reject documents that are not HTML. A missing type is assumed to be HTML.
pub fn ensure_html(url: &str, content_type: Option<&str>) -> Result<(), RenderError> {
    match content_type {
        Some(content_type) if !is_html_content_type(content_type) => Err(RenderError::NotHtml {
            url: url.to_string(),
            content_type: content_type.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Renderer backed by a plain HTTP GET.
#[derive(Clone)]
pub struct StaticRenderer {
    client: HttpClient,
}

impl StaticRenderer {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageRenderer for StaticRenderer {
    fn name(&self) -> &str {
        "static"
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let response = self.client.get(url).await?;

        if !response.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: response.status.as_u16(),
            });
        }

        ensure_html(url, response.content_type())?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_display() {
        let err = RenderError::Status {
            url: "https://example.gov.pl".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "https://example.gov.pl returned 503");

        let err = RenderError::NotHtml {
            url: "https://example.gov.pl/a.pdf".to_string(),
            content_type: "application/pdf".to_string(),
        };
        assert!(err.to_string().contains("application/pdf"));
    }

    #[test]
    fn non_html_documents_are_rejected() {
        assert!(ensure_html("https://gov.pl/a", Some("text/html; charset=utf-8")).is_ok());
        assert!(ensure_html("https://gov.pl/a", None).is_ok());

        let err = ensure_html("https://gov.pl/a.pdf", Some("application/pdf")).unwrap_err();
        assert!(matches!(
            err,
            RenderError::NotHtml { ref content_type, .. } if content_type == "application/pdf"
        ));
    }

    #[test]
    fn render_strategy_parses_from_config() {
        let strategy: RenderStrategy = serde_json::from_str("\"browser\"").unwrap();
        assert_eq!(strategy, RenderStrategy::Browser);
        assert_eq!(RenderStrategy::default(), RenderStrategy::Static);
    }
}
