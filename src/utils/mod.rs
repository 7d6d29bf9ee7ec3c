//! Shared utility functions.
//!
//! - `html`: visible-text extraction and whitespace normalization

mod html;

pub use html::{normalize_whitespace, visible_text};
