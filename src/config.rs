//! Configuration management.
//!
//! Every field has a default, so a run without a config file searches Google
//! for each catalog title and keeps `gov.pl` links, five titles at a time,
//! with a fixed two-second pause between batches.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_CATALOG_URL;
use crate::filter::{FilterMode, DEFAULT_DOMAIN};
use crate::http_client::DEFAULT_TIMEOUT;
use crate::pacing::{PacingPolicy, PacingScope};
use crate::render::RenderStrategy;
use crate::retry::{RetryPolicy, DEFAULT_ATTEMPTS, DEFAULT_BACKOFF};
use crate::scheduler::DEFAULT_BATCH_SIZE;
use crate::search::{SearchEngine, DEFAULT_MAX_RESULTS};
use crate::sink::DEFAULT_OUTPUT;

/// Config file names probed in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "govlinks.toml",
    "govlinks.yaml",
    "govlinks.yml",
    "govlinks.json",
];

/// Default pause length in milliseconds.
pub const DEFAULT_PACING_MS: u64 = 2000;

/// Error type for loading and validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog search endpoint.
    pub url: String,
    /// Cap on titles processed (0 = all).
    pub max_titles: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            max_titles: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub engine: SearchEngine,
    /// Override for the engine's search endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Add a `site:` operator for the target domain to each query.
    pub restrict_to_domain: bool,
    pub max_results: usize,
    /// `rotate`, `fixed`, or a literal User-Agent string.
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: SearchEngine::default(),
            base_url: None,
            restrict_to_domain: false,
            max_results: DEFAULT_MAX_RESULTS,
            user_agent: "rotate".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.engine.default_base_url())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub mode: FilterMode,
    /// Domain token every kept link must contain.
    pub domain: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            mode: FilterMode::default(),
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub strategy: RenderStrategy,
    pub headless: bool,
    /// Chrome binary; discovered from common locations when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            strategy: RenderStrategy::default(),
            headless: true,
            chrome_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacingKind {
    #[default]
    Fixed,
    Jittered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub policy: PacingKind,
    pub fixed_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
    /// Where pauses go; derived from the filter mode when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<PacingScope>,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            policy: PacingKind::Fixed,
            fixed_ms: DEFAULT_PACING_MS,
            min_ms: 1000,
            max_ms: 3000,
            scope: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff_ms: DEFAULT_BACKOFF.as_millis() as u64,
        }
    }
}

/// Main configuration.
///
/// Plain fields come before the section tables so the struct serializes to
/// valid TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Titles processed concurrently per batch.
    pub batch_size: usize,
    /// Output file for matched records.
    pub output: String,
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub filter: FilterConfig,
    pub render: RenderConfig,
    pub http: HttpConfig,
    pub pacing: PacingConfig,
    pub retry: RetryConfig,
    /// File this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            output: DEFAULT_OUTPUT.to_string(),
            catalog: CatalogConfig::default(),
            search: SearchConfig::default(),
            filter: FilterConfig::default(),
            render: RenderConfig::default(),
            http: HttpConfig::default(),
            pacing: PacingConfig::default(),
            retry: RetryConfig::default(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise the first `govlinks.*` file in
    /// the working directory is used, falling back to defaults.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => Self::load_from_path(path).await?,
            None => match Self::discover(Path::new(".")) {
                Some(path) => {
                    tracing::debug!("Found config file: {}", path.display());
                    Self::load_from_path(&path).await?
                }
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Find a config file in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load configuration from a specific file path.
    /// Format is chosen by extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        let path = PathBuf::from(expanded);

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.clone(),
            format,
            message,
        };

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| parse_error("TOML", e.to_string()))?,
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|e| parse_error("YAML", e.to_string()))?
            }
            _ => serde_json::from_str(&contents).map_err(|e| parse_error("JSON", e.to_string()))?,
        };

        config.source_path = Some(path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batch_size must be at least 1".into()));
        }
        if self.retry.attempts == 0 {
            return Err(ConfigError::Invalid("retry.attempts must be at least 1".into()));
        }
        if self.filter.domain.trim().is_empty() {
            return Err(ConfigError::Invalid("filter.domain must not be empty".into()));
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::Invalid("output must not be empty".into()));
        }
        Ok(())
    }

    pub fn pacing_policy(&self) -> PacingPolicy {
        match self.pacing.policy {
            PacingKind::Fixed => PacingPolicy::fixed_ms(self.pacing.fixed_ms),
            PacingKind::Jittered => PacingPolicy::jittered_ms(self.pacing.min_ms, self.pacing.max_ms),
        }
    }

    /// Effective pacing scope.
    ///
    /// Verification scope only applies when pages are verified; otherwise
    /// pauses fall back to batch boundaries.
    pub fn pacing_scope(&self) -> PacingScope {
        let verifies = self.filter.mode.verifies_pages();
        match self.pacing.scope {
            Some(PacingScope::Verification) if !verifies => {
                tracing::warn!(
                    "pacing.scope = verification has no effect in {} mode; pacing between batches",
                    self.filter.mode.as_str()
                );
                PacingScope::Batch
            }
            Some(scope) => scope,
            None if verifies => PacingScope::Verification,
            None => PacingScope::Batch,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.attempts,
            Duration::from_millis(self.retry.backoff_ms),
        )
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.output).into_owned())
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
