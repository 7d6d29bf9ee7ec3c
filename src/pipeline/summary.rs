//! Per-title outcomes and run totals.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::MatchRecord;

/// What processing one catalog title produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleOutcome {
    pub records: Vec<MatchRecord>,
    /// The search call failed and was treated as zero results.
    pub search_failed: bool,
    /// Results left after result-level filtering.
    pub candidates: usize,
    pub verified: usize,
    pub rejected: usize,
    pub inconclusive: usize,
}

impl TitleOutcome {
    pub fn search_failed() -> Self {
        Self {
            search_failed: true,
            ..Self::default()
        }
    }
}

/// Counters reported when a run finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub titles_loaded: usize,
    pub titles_searched: usize,
    pub search_errors: usize,
    pub candidates: usize,
    pub verified: usize,
    pub rejected: usize,
    pub inconclusive: usize,
    pub records_written: usize,
    /// Titles whose processing panicked.
    pub item_failures: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            titles_loaded: 0,
            titles_searched: 0,
            search_errors: 0,
            candidates: 0,
            verified: 0,
            rejected: 0,
            inconclusive: 0,
            records_written: 0,
            item_failures: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Fold one title's counters into the totals.
    pub fn record(&mut self, outcome: &TitleOutcome) {
        self.titles_searched += 1;
        if outcome.search_failed {
            self.search_errors += 1;
        }
        self.candidates += outcome.candidates;
        self.verified += outcome.verified;
        self.rejected += outcome.rejected;
        self.inconclusive += outcome.inconclusive;
    }
}
