//! The `run` command.

use anyhow::Context;
use clap::Args;
use tracing::{error, info};

use govlinks::filter::FilterMode;
use govlinks::render::RenderStrategy;
use govlinks::search::SearchEngine;
use govlinks::{Config, Pipeline};

use crate::cli::progress;

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Filtering behavior
    #[arg(short, long, value_enum)]
    mode: Option<FilterMode>,

    /// Domain token links must contain (e.g. gov.pl)
    #[arg(short, long)]
    domain: Option<String>,

    /// Search provider
    #[arg(short, long, value_enum)]
    engine: Option<SearchEngine>,

    /// Render pages in a headless browser
    #[arg(long)]
    browser: bool,

    /// Titles searched concurrently per batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Output JSON file
    #[arg(short, long)]
    output: Option<String>,

    /// Process at most this many titles (0 = all)
    #[arg(short = 'n', long)]
    max_titles: Option<usize>,

    /// Restrict searches upstream with a site: operator
    #[arg(long)]
    restrict: bool,
}

impl RunArgs {
    /// Overlay command-line flags on the loaded config.
    fn apply(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.filter.mode = mode;
        }
        if let Some(domain) = &self.domain {
            config.filter.domain = domain.clone();
        }
        if let Some(engine) = self.engine {
            if engine != config.search.engine {
                // A configured endpoint belongs to the configured engine.
                config.search.base_url = None;
            }
            config.search.engine = engine;
        }
        if self.browser {
            config.render.strategy = RenderStrategy::Browser;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(max_titles) = self.max_titles {
            config.catalog.max_titles = max_titles;
        }
        if self.restrict {
            config.search.restrict_to_domain = true;
        }
    }
}

pub async fn cmd_run(mut config: Config, args: &RunArgs) -> anyhow::Result<()> {
    args.apply(&mut config);
    config.validate().context("Invalid run options")?;

    info!(
        "Starting run: {} via {} ({} renderer), output {}",
        config.filter.mode.as_str(),
        config.search.engine.name(),
        match config.render.strategy {
            RenderStrategy::Static => "static",
            RenderStrategy::Browser => "browser",
        },
        config.output
    );

    let bar = progress::title_bar();
    let pipeline = Pipeline::from_config(&config)?.with_progress(bar.clone());

    progress::set_active_bar(Some(bar));
    let result = pipeline.run().await;
    progress::set_active_bar(None);

    match result {
        Ok(summary) => {
            progress::print_summary(
                &summary,
                &config.output_path().display().to_string(),
                config.filter.mode.verifies_pages(),
            );
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
