//! govlinks - find public-sector web pages that mention catalog titles.
//!
//! Titles are pulled from a bibliographic catalog, searched on the web in
//! small concurrent batches, filtered to a target domain (optionally
//! confirming the title on the page itself) and written to a JSON file.

pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod http_client;
pub mod models;
pub mod pacing;
pub mod pipeline;
pub mod render;
pub mod retry;
pub mod scheduler;
pub mod search;
pub mod sink;
pub mod utils;
pub mod verify;

pub use config::Config;
pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineSettings, RunSummary};
