//! Headless browser renderer.
//!
//! Uses chromiumoxide (CDP). Each render launches its own browser and closes
//! it afterwards, so no cookies or navigation state leak between titles.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use tracing::{debug, warn};

#[cfg(feature = "browser")]
use super::ensure_html;
use super::{PageRenderer, RenderError};
use crate::http_client::{UserAgentPolicy, DEFAULT_TIMEOUT};

/// Browser renderer configuration.
#[derive(Debug, Clone)]
pub struct BrowserRenderConfig {
    /// Run without a visible window.
    pub headless: bool,
    /// Explicit Chrome/Chromium executable. Common locations are searched when unset.
    pub chrome_path: Option<PathBuf>,
    /// Navigation timeout.
    pub timeout: Duration,
    /// User agent applied to every page.
    pub user_agent: UserAgentPolicy,
}

impl Default for BrowserRenderConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: UserAgentPolicy::Rotate,
        }
    }
}

/// Renderer that loads pages in headless Chrome.
pub struct BrowserRenderer {
    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    config: BrowserRenderConfig,
}

impl BrowserRenderer {
    pub fn new(config: BrowserRenderConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "browser")]
impl BrowserRenderer {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    fn find_chrome(&self) -> Result<PathBuf, RenderError> {
        if let Some(ref path) = self.config.chrome_path {
            return Ok(path.clone());
        }

        Self::CHROME_PATHS
            .iter()
            .map(std::path::Path::new)
            .find(|p| p.exists())
            .map(|p| p.to_path_buf())
            .ok_or_else(|| {
                RenderError::Browser(
                    "Chrome/Chromium not found; set render.chrome_path in the config".to_string(),
                )
            })
    }

    async fn launch(&self) -> Result<(Browser, tokio::task::JoinHandle<()>), RenderError> {
        let chrome_path = self.find_chrome()?;
        debug!(
            "Launching browser {} (headless={})",
            chrome_path.display(),
            self.config.headless
        );

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox")
            .arg("--disable-gpu");

        let config = builder.build().map_err(RenderError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Browser(format!("Failed to launch browser: {}", e)))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok((browser, handle))
    }

    async fn render_page(&self, page: &Page, url: &str) -> Result<String, RenderError> {
        page.execute(SetUserAgentOverrideParams::new(
            self.config.user_agent.resolve(),
        ))
        .await
        .map_err(|e| RenderError::Browser(e.to_string()))?;

        let nav_params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| RenderError::Browser(format!("Invalid URL: {}", e)))?;

        tokio::time::timeout(self.config.timeout, page.execute(nav_params))
            .await
            .map_err(|_| RenderError::Timeout(self.config.timeout.as_secs()))?
            .map_err(|e| RenderError::Browser(format!("Navigation failed for {}: {}", url, e)))?;

        if tokio::time::timeout(self.config.timeout, page.wait_for_navigation())
            .await
            .is_err()
        {
            warn!("Timeout waiting for {} to finish loading", url);
        }

        // Give client-side rendering a moment to populate results.
        tokio::time::sleep(Duration::from_millis(500)).await;

        // Chrome opens PDFs and other documents in a viewer; only HTML counts.
        let content_type: String = page
            .evaluate("document.contentType".to_string())
            .await
            .map_err(|e| RenderError::Browser(e.to_string()))?
            .into_value()
            .map_err(|e| RenderError::Browser(format!("Unreadable document type: {}", e)))?;
        ensure_html(url, Some(&content_type))?;

        page.content()
            .await
            .map_err(|e| RenderError::Browser(e.to_string()))
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl PageRenderer for BrowserRenderer {
    fn name(&self) -> &str {
        "browser"
    }

    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let (mut browser, handle) = self.launch().await?;
        debug!("Rendering {} in browser", url);

        let result = match browser.new_page("about:blank").await {
            Ok(page) => {
                let result = self.render_page(&page, url).await;
                let _ = page.close().await;
                result
            }
            Err(e) => Err(RenderError::Browser(e.to_string())),
        };

        let _ = browser.close().await;
        handle.abort();
        result
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
#[async_trait]
impl PageRenderer for BrowserRenderer {
    fn name(&self) -> &str {
        "browser"
    }

    async fn render(&self, _url: &str) -> Result<String, RenderError> {
        Err(RenderError::BrowserUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_shared_timeout() {
        let config = BrowserRenderConfig::default();
        assert!(config.headless);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn renders_fail_without_browser_support() {
        let renderer = BrowserRenderer::new(BrowserRenderConfig::default());
        let err = renderer.render("https://www.gov.pl").await.unwrap_err();
        assert!(matches!(err, RenderError::BrowserUnavailable));
    }
}
