//! Data models for govlinks.

mod record;
mod search_result;

pub use record::{MatchRecord, ResultSet};
pub use search_result::SearchResult;
