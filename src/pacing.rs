//! Delay policies applied between outbound requests.
//!
//! A `PacingPolicy` is chosen per run and handed to whatever issues
//! requests; `PacingScope` decides where the pauses go.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How long to wait between request units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingPolicy {
    /// Always wait the same duration.
    Fixed(Duration),
    /// Wait a uniformly random duration in `[min, max)`.
    Jittered { min: Duration, max: Duration },
}

impl PacingPolicy {
    pub fn fixed_ms(ms: u64) -> Self {
        PacingPolicy::Fixed(Duration::from_millis(ms))
    }

    pub fn jittered_ms(min_ms: u64, max_ms: u64) -> Self {
        PacingPolicy::Jittered {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
        }
    }

    /// No delay at all.
    pub fn none() -> Self {
        PacingPolicy::Fixed(Duration::ZERO)
    }

    /// Pick the next delay. A jittered range with `min >= max` yields `min`.
    pub fn next_delay(&self) -> Duration {
        match *self {
            PacingPolicy::Fixed(delay) => delay,
            PacingPolicy::Jittered { min, max } => {
                let lo = min.as_millis() as u64;
                let hi = max.as_millis() as u64;
                if lo >= hi {
                    return min;
                }
                Duration::from_millis(rand::thread_rng().gen_range(lo..hi))
            }
        }
    }

    /// Sleep for the next delay.
    pub async fn pause(&self, reason: &str) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        debug!("Waiting {:?} ({})", delay, reason);
        tokio::time::sleep(delay).await;
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        PacingPolicy::fixed_ms(2000)
    }
}

/// Where pacing delays are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PacingScope {
    /// After each batch of titles settles.
    Batch,
    /// After each page-verification fetch.
    Verification,
}
