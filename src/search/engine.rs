//! Built-in search providers and their result markup contracts.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::SearchError;
use crate::models::SearchResult;
use crate::utils::normalize_whitespace;

/// Google search URL.
const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

/// DuckDuckGo HTML search URL.
const DDG_SEARCH_URL: &str = "https://html.duckduckgo.com/html/";

/// CSS selectors locating the parts of one organic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultSelectors {
    /// One element per organic result.
    pub container: &'static str,
    /// Heading inside the container.
    pub title: &'static str,
    /// Anchor inside the container carrying the target link.
    pub link: &'static str,
    /// Snippet block inside the container.
    pub snippet: &'static str,
}

/// Supported search providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[default]
    Google,
    #[serde(alias = "ddg")]
    #[value(name = "duckduckgo", alias = "ddg")]
    DuckDuckGo,
}

impl SearchEngine {
    pub fn name(&self) -> &'static str {
        match self {
            SearchEngine::Google => "google",
            SearchEngine::DuckDuckGo => "duckduckgo",
        }
    }

    /// Search endpoint used when the config does not override it.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            SearchEngine::Google => GOOGLE_SEARCH_URL,
            SearchEngine::DuckDuckGo => DDG_SEARCH_URL,
        }
    }

    pub fn selectors(&self) -> ResultSelectors {
        match self {
            SearchEngine::Google => ResultSelectors {
                container: ".tF2Cxc",
                title: "h3",
                link: "a",
                snippet: ".VwiC3b",
            },
            SearchEngine::DuckDuckGo => ResultSelectors {
                container: ".result",
                title: "a.result__a",
                link: "a.result__a",
                snippet: ".result__snippet",
            },
        }
    }

    /// Parse up to `limit` results from a results page (0 = no limit).
    ///
    /// Results without a usable link are skipped.
    pub fn parse_results(&self, html: &str, limit: usize) -> Result<Vec<SearchResult>, SearchError> {
        let selectors = self.selectors();
        let container = parse_selector(selectors.container)?;
        let title = parse_selector(selectors.title)?;
        let link = parse_selector(selectors.link)?;
        let snippet = parse_selector(selectors.snippet)?;

        let document = Html::parse_document(html);
        let mut results = Vec::new();

        for element in document.select(&container) {
            if limit > 0 && results.len() >= limit {
                break;
            }

            let href = element
                .select(&link)
                .find_map(|a| a.value().attr("href"));
            let Some(url) = href.and_then(|h| self.resolve_link(h)) else {
                debug!("Skipping {} result without a usable link", self.name());
                continue;
            };

            results.push(SearchResult {
                title: first_text(element, &title),
                link: url,
                snippet: first_text(element, &snippet),
            });
        }

        debug!("Parsed {} results from {}", results.len(), self.name());
        Ok(results)
    }

    /// Turn a result `href` into the target URL.
    ///
    /// Relative links are resolved against the engine, provider redirect
    /// wrappers are unwrapped, and links back into the engine itself or to
    /// non-HTTP schemes are rejected.
    pub fn resolve_link(&self, href: &str) -> Option<String> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let base = Url::parse(self.default_base_url()).ok()?;
        let url = base.join(href).ok()?;

        let own_host = url.host_str().is_some_and(|host| self.is_own_host(host));
        let target = if own_host {
            match (self, url.path()) {
                (SearchEngine::Google, "/url") => {
                    query_param(&url, "q").or_else(|| query_param(&url, "url"))?
                }
                (SearchEngine::DuckDuckGo, "/l/") => query_param(&url, "uddg")?,
                _ => return None,
            }
        } else {
            url.to_string()
        };

        let parsed = Url::parse(&target).ok()?;
        match parsed.scheme() {
            "http" | "https" => Some(target),
            _ => None,
        }
    }
}

impl SearchEngine {
    /// Whether `host` belongs to the provider itself (any subdomain).
    fn is_own_host(&self, host: &str) -> bool {
        let domain = match self {
            SearchEngine::Google => "google.com",
            SearchEngine::DuckDuckGo => "duckduckgo.com",
        };
        let host = host.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, SearchError> {
    Selector::parse(selector).map_err(|e| SearchError::Selector(format!("{}: {:?}", selector, e)))
}

fn query_param(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

fn first_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| normalize_whitespace(&e.text().collect::<String>()))
        .unwrap_or_default()
}
