//! Command-line interface.

mod commands;
mod icons;
pub mod progress;

pub use commands::{is_verbose, run};
