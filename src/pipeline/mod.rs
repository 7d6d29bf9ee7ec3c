//! The catalog → search → filter → verify → persist pipeline.

mod summary;

pub use summary::{RunSummary, TitleOutcome};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::catalog::{load_seeds, CatalogSource, KeywordFilters, PolonaCatalog};
use crate::config::{Config, ConfigError};
use crate::error::Result;
use crate::filter::{filter, FilterMode};
use crate::http_client::{HttpClient, UserAgentPolicy};
use crate::models::{MatchRecord, ResultSet, SearchResult};
use crate::pacing::{PacingPolicy, PacingScope};
use crate::render::{BrowserRenderConfig, BrowserRenderer, PageRenderer, RenderStrategy, StaticRenderer};
use crate::retry::RetryPolicy;
use crate::scheduler::{BatchScheduler, ItemOutcome};
use crate::search::{SearchExecutor, WebSearch};
use crate::sink::{JsonFileSink, ResultSink};
use crate::verify::{PhraseVerifier, RenderedPageVerifier, Verification};

/// Run parameters that are not collaborators.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub keyword_filters: KeywordFilters,
    pub mode: FilterMode,
    pub domain: String,
    /// Pass the domain to the search provider as a `site:` restriction.
    pub restrict_to_domain: bool,
    /// Cap on titles processed (0 = all).
    pub max_titles: usize,
    pub batch_size: usize,
    pub pacing: PacingPolicy,
    pub pacing_scope: PacingScope,
    pub retry: RetryPolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            keyword_filters: KeywordFilters::default(),
            mode: config.filter.mode,
            domain: config.filter.domain.trim().to_string(),
            restrict_to_domain: config.search.restrict_to_domain,
            max_titles: config.catalog.max_titles,
            batch_size: config.batch_size,
            pacing: config.pacing_policy(),
            pacing_scope: config.pacing_scope(),
            retry: config.retry_policy(),
        }
    }
}

/// One configured run.
pub struct Pipeline {
    settings: PipelineSettings,
    catalog: Box<dyn CatalogSource>,
    search: Box<dyn SearchExecutor>,
    verifier: Option<Box<dyn PhraseVerifier>>,
    sink: Box<dyn ResultSink>,
    progress: Option<ProgressBar>,
}

impl Pipeline {
    pub fn new(
        settings: PipelineSettings,
        catalog: Box<dyn CatalogSource>,
        search: Box<dyn SearchExecutor>,
        sink: Box<dyn ResultSink>,
    ) -> Self {
        Self {
            settings,
            catalog,
            search,
            verifier: None,
            sink,
            progress: None,
        }
    }

    /// Verifier used in `verified-page` mode.
    pub fn with_verifier(mut self, verifier: Box<dyn PhraseVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Progress bar advanced once per processed title.
    pub fn with_progress(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Wire the production collaborators described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = PipelineSettings::from_config(config);
        let user_agent = UserAgentPolicy::from_config(&config.search.user_agent);
        let client = HttpClient::new(config.http.timeout(), user_agent.clone())
            .map_err(|e| ConfigError::Invalid(format!("failed to build HTTP client: {}", e)))?;

        let renderer: Arc<dyn PageRenderer> = match config.render.strategy {
            RenderStrategy::Static => Arc::new(StaticRenderer::new(client.clone())),
            RenderStrategy::Browser => Arc::new(BrowserRenderer::new(BrowserRenderConfig {
                headless: config.render.headless,
                chrome_path: config.render.chrome_path.as_deref().map(|p| {
                    PathBuf::from(shellexpand::tilde(p).into_owned())
                }),
                timeout: config.http.timeout(),
                user_agent,
            })),
        };

        let catalog = PolonaCatalog::with_url(client, &config.catalog.url);
        let search = WebSearch::new(config.search.engine, renderer.clone())
            .with_base_url(config.search.base_url())
            .with_max_results(config.search.max_results);
        let sink = JsonFileSink::new(config.output_path());

        let mut pipeline = Self::new(settings, Box::new(catalog), Box::new(search), Box::new(sink));
        if config.filter.mode.verifies_pages() {
            pipeline = pipeline.with_verifier(Box::new(RenderedPageVerifier::new(renderer)));
        }
        Ok(pipeline)
    }

    /// Execute the run end to end.
    ///
    /// Fails only when no seeds can be loaded or the results cannot be
    /// written. Per-title failures are logged and counted.
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let mut summary = RunSummary::new(Utc::now());

        if self.settings.mode.verifies_pages() && self.verifier.is_none() {
            return Err(ConfigError::Invalid(
                "verified-page mode requires a page verifier".into(),
            )
            .into());
        }

        let mut titles = load_seeds(
            self.catalog.as_ref(),
            &self.settings.keyword_filters,
            &self.settings.retry,
        )
        .await?;
        summary.titles_loaded = titles.len();

        if self.settings.max_titles > 0 && titles.len() > self.settings.max_titles {
            info!(
                "Processing the first {} of {} titles",
                self.settings.max_titles,
                titles.len()
            );
            titles.truncate(self.settings.max_titles);
        }

        if let Some(bar) = &self.progress {
            bar.set_length(titles.len() as u64);
        }

        let mut scheduler = BatchScheduler::new(self.settings.batch_size);
        if self.settings.pacing_scope == PacingScope::Batch {
            scheduler = scheduler.with_batch_pacing(self.settings.pacing);
        }
        info!(
            "Searching {} titles in {} batches of up to {} ({} mode, domain {})",
            titles.len(),
            scheduler.batch_count(titles.len()),
            scheduler.batch_size(),
            self.settings.mode.as_str(),
            self.settings.domain
        );

        let outcomes = scheduler
            .run(&titles, |title| self.process_title(title))
            .await;

        let mut results = ResultSet::new();
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Done(outcome) => {
                    summary.record(&outcome);
                    results.extend(outcome.records);
                }
                ItemOutcome::Panicked(_) => {
                    summary.titles_searched += 1;
                    summary.item_failures += 1;
                }
            }
        }

        if let Some(bar) = &self.progress {
            bar.finish_and_clear();
        }

        info!(
            "Persisting {} records to {}",
            results.len(),
            self.sink.describe()
        );
        self.sink.persist(results.records()).await?;
        summary.records_written = results.len();
        summary.elapsed = started.elapsed();

        Ok(summary)
    }

    /// Search, filter and optionally verify one catalog title.
    async fn process_title(&self, title: &str) -> TitleOutcome {
        let outcome = self.search_and_filter(title).await;
        if let Some(bar) = &self.progress {
            bar.inc(1);
        }
        outcome
    }

    async fn search_and_filter(&self, title: &str) -> TitleOutcome {
        let restrict = self
            .settings
            .restrict_to_domain
            .then_some(self.settings.domain.as_str());

        let results = match self.search.search(title, restrict).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Search failed for \"{}\": {}", title, e);
                return TitleOutcome::search_failed();
            }
        };
        debug!("{} results for \"{}\"", results.len(), title);

        let criteria = self.settings.mode.criteria(&self.settings.domain, title);
        let candidates = filter(results, &criteria);
        let mut outcome = TitleOutcome {
            candidates: candidates.len(),
            ..TitleOutcome::default()
        };

        let kept = match &self.verifier {
            Some(verifier) if self.settings.mode.verifies_pages() => {
                self.verify_candidates(&**verifier, title, candidates, &mut outcome)
                    .await
            }
            _ => candidates,
        };

        if kept.is_empty() {
            debug!("No {} matches for \"{}\"", self.settings.domain, title);
        } else {
            info!(
                "Found {} {} matches for \"{}\"",
                kept.len(),
                self.settings.domain,
                title
            );
        }

        outcome.records = kept
            .into_iter()
            .map(|result| MatchRecord::from_result(title, result))
            .collect();
        outcome
    }

    /// Keep candidates whose page contains the title, checking them one at a
    /// time and pacing after each fetch when configured.
    async fn verify_candidates(
        &self,
        verifier: &dyn PhraseVerifier,
        title: &str,
        candidates: Vec<SearchResult>,
        outcome: &mut TitleOutcome,
    ) -> Vec<SearchResult> {
        let mut kept = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match verifier.check(&candidate.link, title).await {
                Verification::Match => {
                    outcome.verified += 1;
                    kept.push(candidate);
                }
                Verification::NoMatch => outcome.rejected += 1,
                Verification::Inconclusive(_) => outcome.inconclusive += 1,
            }

            if self.settings.pacing_scope == PacingScope::Verification {
                self.settings.pacing.pause("after page verification").await;
            }
        }
        kept
    }
}
