//! End-to-end pipeline runs against in-process collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use govlinks::catalog::{CatalogError, CatalogSource, KeywordFilters};
use govlinks::filter::FilterMode;
use govlinks::models::{MatchRecord, SearchResult};
use govlinks::pacing::PacingPolicy;
use govlinks::render::{PageRenderer, RenderError};
use govlinks::retry::RetryPolicy;
use govlinks::search::{SearchEngine, SearchError, SearchExecutor, WebSearch};
use govlinks::sink::{JsonFileSink, PersistenceError, ResultSink};
use govlinks::{Pipeline, PipelineError, PipelineSettings};

struct StubCatalog(Vec<String>);

impl StubCatalog {
    fn new(titles: &[&str]) -> Self {
        Self(titles.iter().map(|t| t.to_string()).collect())
    }
}

#[async_trait]
impl CatalogSource for StubCatalog {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_titles(&self, _: &KeywordFilters) -> Result<Vec<String>, CatalogError> {
        Ok(self.0.clone())
    }
}

struct DownCatalog;

#[async_trait]
impl CatalogSource for DownCatalog {
    fn name(&self) -> &str {
        "down"
    }

    async fn fetch_titles(&self, _: &KeywordFilters) -> Result<Vec<String>, CatalogError> {
        Err(CatalogError::Status(503))
    }
}

/// Search stub with canned results, injected failures, and concurrency tracking.
#[derive(Default)]
struct StubSearch {
    results: HashMap<String, Vec<SearchResult>>,
    failing: Vec<String>,
    panicking: Vec<String>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    log: Mutex<Vec<String>>,
}

impl StubSearch {
    fn with(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.results.insert(query.to_string(), results);
        self
    }
}

#[async_trait]
impl SearchExecutor for StubSearch {
    async fn search(
        &self,
        query: &str,
        _restrict_domain: Option<&str>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("start {}", query));

        tokio::time::sleep(self.delay).await;

        self.log.lock().unwrap().push(format!("end {}", query));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.iter().any(|q| q == query) {
            panic!("parser blew up on {}", query);
        }
        if self.failing.iter().any(|q| q == query) {
            return Err(SearchError::EmptyDocument);
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

#[derive(Clone, Default)]
struct MemorySink(Arc<Mutex<Option<Vec<MatchRecord>>>>);

impl MemorySink {
    fn written(&self) -> Vec<MatchRecord> {
        self.0.lock().unwrap().clone().expect("sink was never called")
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn persist(&self, records: &[MatchRecord]) -> Result<(), PersistenceError> {
        *self.0.lock().unwrap() = Some(records.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

fn settings(batch_size: usize) -> PipelineSettings {
    PipelineSettings {
        mode: FilterMode::Domain,
        batch_size,
        pacing: PacingPolicy::none(),
        retry: RetryPolicy::new(2, Duration::ZERO),
        ..PipelineSettings::default()
    }
}

fn gov(title: &str, n: usize) -> SearchResult {
    SearchResult::new(title, format!("https://www.gov.pl/{}", n), "...")
}

#[tokio::test]
async fn keeps_only_target_domain_results_with_their_phrase() {
    let search = StubSearch::default()
        .with(
            "Historia Polski",
            vec![SearchResult::new(
                "Historia Polski – gov.pl",
                "https://mkidn.gov.pl/a",
                "...",
            )],
        )
        .with(
            "Kodeks",
            vec![SearchResult::new("Kodeks – wikipedia", "https://wiki.org/b", "...")],
        );
    let sink = MemorySink::default();
    let pipeline = Pipeline::new(
        settings(5),
        Box::new(StubCatalog::new(&["Historia Polski", "Kodeks"])),
        Box::new(search),
        Box::new(sink.clone()),
    );

    let summary = pipeline.run().await.unwrap();

    assert_eq!(
        sink.written(),
        vec![MatchRecord {
            fraza: "Historia Polski".into(),
            title: "Historia Polski – gov.pl".into(),
            link: "https://mkidn.gov.pl/a".into(),
            snippet: "...".into(),
        }]
    );
    assert_eq!(summary.titles_loaded, 2);
    assert_eq!(summary.records_written, 1);
}

#[tokio::test]
async fn failing_titles_do_not_affect_siblings_or_later_batches() {
    let titles: Vec<String> = (0..7).map(|i| format!("t{}", i)).collect();
    let mut search = StubSearch {
        failing: vec!["t1".into()],
        panicking: vec!["t3".into()],
        ..StubSearch::default()
    };
    for (i, title) in titles.iter().enumerate() {
        search.results.insert(title.clone(), vec![gov(title, i)]);
    }
    let sink = MemorySink::default();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let pipeline = Pipeline::new(
        settings(3),
        Box::new(StubCatalog::new(&refs)),
        Box::new(search),
        Box::new(sink.clone()),
    );

    let summary = pipeline.run().await.unwrap();

    let phrases: Vec<String> = sink.written().into_iter().map(|r| r.fraza).collect();
    assert_eq!(phrases, ["t0", "t2", "t4", "t5", "t6"]);
    assert_eq!(summary.titles_searched, 7);
    assert_eq!(summary.search_errors, 1);
    assert_eq!(summary.item_failures, 1);
}

#[tokio::test]
async fn twelve_titles_run_in_three_sequential_batches() {
    let titles: Vec<String> = (0..12).map(|i| format!("t{:02}", i)).collect();
    let search = Arc::new(StubSearch {
        delay: Duration::from_millis(20),
        ..StubSearch::default()
    });

    struct Shared(Arc<StubSearch>);

    #[async_trait]
    impl SearchExecutor for Shared {
        async fn search(
            &self,
            query: &str,
            restrict_domain: Option<&str>,
        ) -> Result<Vec<SearchResult>, SearchError> {
            self.0.search(query, restrict_domain).await
        }
    }

    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let pipeline = Pipeline::new(
        settings(5),
        Box::new(StubCatalog::new(&refs)),
        Box::new(Shared(search.clone())),
        Box::new(MemorySink::default()),
    );
    pipeline.run().await.unwrap();

    assert_eq!(search.max_in_flight.load(Ordering::SeqCst), 5);

    let log = search.log.lock().unwrap();
    let position = |entry: String| log.iter().position(|e| *e == entry).unwrap();
    let last_end_of = |batch: &[String]| {
        batch
            .iter()
            .map(|t| position(format!("end {}", t)))
            .max()
            .unwrap()
    };
    let first_start_of = |batch: &[String]| {
        batch
            .iter()
            .map(|t| position(format!("start {}", t)))
            .min()
            .unwrap()
    };

    assert!(last_end_of(&titles[0..5]) < first_start_of(&titles[5..10]));
    assert!(last_end_of(&titles[5..10]) < first_start_of(&titles[10..12]));
}

#[tokio::test]
async fn records_keep_their_own_phrase_for_shared_links() {
    let shared = SearchResult::new("Portal gov.pl", "https://www.gov.pl/web/portal", "");
    let search = StubSearch::default()
        .with("Ustawa o archiwach", vec![shared.clone()])
        .with("Ustawa o muzeach", vec![shared.clone()]);
    let sink = MemorySink::default();
    let pipeline = Pipeline::new(
        settings(5),
        Box::new(StubCatalog::new(&["Ustawa o archiwach", "Ustawa o muzeach"])),
        Box::new(search),
        Box::new(sink.clone()),
    );

    pipeline.run().await.unwrap();

    let written = sink.written();
    assert_eq!(written.len(), 2);
    assert_eq!(written[0].fraza, "Ustawa o archiwach");
    assert_eq!(written[1].fraza, "Ustawa o muzeach");
    assert!(written.iter().all(|r| r.link == shared.link));
}

#[tokio::test]
async fn unreachable_catalog_aborts_without_writing() {
    let sink = MemorySink::default();
    let pipeline = Pipeline::new(
        settings(5),
        Box::new(DownCatalog),
        Box::new(StubSearch::default()),
        Box::new(sink.clone()),
    );

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::SourceUnavailable { attempts: 2, .. }
    ));
    assert!(sink.0.lock().unwrap().is_none());
}

/// Renderer serving a fixed Google results page.
struct GoogleFixture;

const GOOGLE_PAGE: &str = r#"<html><body><div id="search">
  <div class="tF2Cxc">
    <a href="/url?q=https://www.gov.pl/web/kultura/historia&amp;sa=U"><h3>Historia Polski - Ministerstwo</h3></a>
    <div class="VwiC3b">Materiały o historii Polski.</div>
  </div>
  <div class="tF2Cxc">
    <a href="https://pl.wikipedia.org/wiki/Historia_Polski"><h3>Historia Polski – Wikipedia</h3></a>
    <div class="VwiC3b">Wolna encyklopedia.</div>
  </div>
</div></body></html>"#;

#[async_trait]
impl PageRenderer for GoogleFixture {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn render(&self, _url: &str) -> Result<String, RenderError> {
        Ok(GOOGLE_PAGE.to_string())
    }
}

#[tokio::test]
async fn parsed_results_are_written_as_pretty_json() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("gov_pl_results.json");

    let pipeline = Pipeline::new(
        settings(5),
        Box::new(StubCatalog::new(&["Historia Polski"])),
        Box::new(WebSearch::new(SearchEngine::Google, Arc::new(GoogleFixture))),
        Box::new(JsonFileSink::new(&output)),
    );
    pipeline.run().await.unwrap();

    let written = std::fs::read_to_string(&output).unwrap();
    let records: Vec<MatchRecord> = serde_json::from_str(&written).unwrap();
    assert_eq!(
        records,
        vec![MatchRecord {
            fraza: "Historia Polski".into(),
            title: "Historia Polski - Ministerstwo".into(),
            link: "https://www.gov.pl/web/kultura/historia".into(),
            snippet: "Materiały o historii Polski.".into(),
        }]
    );
    assert!(written.contains("\n  {\n    \"fraza\": \"Historia Polski\",\n"));
}
