//! Bounded-concurrency batch driver.
//!
//! Items are split into fixed-size batches. Every item in a batch is polled
//! concurrently on the current task; a batch settles completely before the
//! next one starts, which caps in-flight work at the batch size.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::pacing::PacingPolicy;

/// Default number of items processed concurrently.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Result of driving a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome<T> {
    /// The item ran to completion.
    Done(T),
    /// The item panicked; siblings were unaffected.
    Panicked(String),
}

impl<T> ItemOutcome<T> {
    pub fn done(self) -> Option<T> {
        match self {
            ItemOutcome::Done(value) => Some(value),
            ItemOutcome::Panicked(_) => None,
        }
    }
}

/// Drives a sequence of items through an async unit of work in batches.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    batch_size: usize,
    pacing: PacingPolicy,
    pace_between_batches: bool,
}

impl BatchScheduler {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pacing: PacingPolicy::none(),
            pace_between_batches: false,
        }
    }

    /// Pause with `pacing` after every batch except the last.
    pub fn with_batch_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self.pace_between_batches = true;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches `len` items split into.
    pub fn batch_count(&self, len: usize) -> usize {
        len.div_ceil(self.batch_size)
    }

    /// Run `work` over every item and return outcomes in input order.
    pub async fn run<'a, I, T, F, Fut>(&self, items: &'a [I], work: F) -> Vec<ItemOutcome<T>>
    where
        F: Fn(&'a I) -> Fut,
        Fut: Future<Output = T>,
    {
        let total_batches = self.batch_count(items.len());
        let mut outcomes = Vec::with_capacity(items.len());
        let work = &work;

        for (index, batch) in items.chunks(self.batch_size).enumerate() {
            debug!(
                "Starting batch {}/{} ({} items)",
                index + 1,
                total_batches,
                batch.len()
            );

            let futures = batch
                .iter()
                .map(|item| AssertUnwindSafe(async move { work(item).await }).catch_unwind());

            for result in join_all(futures).await {
                outcomes.push(match result {
                    Ok(value) => ItemOutcome::Done(value),
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        warn!("Item in batch {} failed: {}", index + 1, message);
                        ItemOutcome::Panicked(message)
                    }
                });
            }

            if self.pace_between_batches && index + 1 < total_batches {
                self.pacing.pause("between batches").await;
            }
        }

        outcomes
    }
}

impl Default for BatchScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
