//! Persisted match records.

use serde::{Deserialize, Serialize};

use super::SearchResult;

/// A search result that survived filtering, tagged with the catalog title
/// that produced it.
///
/// Field order is the on-disk order: `fraza`, `title`, `link`, `snippet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// The catalog title used as the search query.
    pub fraza: String,
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl MatchRecord {
    /// Attach the originating phrase to a search result.
    pub fn from_result(fraza: &str, result: SearchResult) -> Self {
        Self {
            fraza: fraza.to_string(),
            title: result.title,
            link: result.link,
            snippet: result.snippet,
        }
    }
}

/// Append-only collection of match records for a single run.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<MatchRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = MatchRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_phrase_and_result_fields() {
        let result = SearchResult::new("Kodeks – gov.pl", "https://ms.gov.pl/k", "opis");
        let record = MatchRecord::from_result("Kodeks", result);

        assert_eq!(record.fraza, "Kodeks");
        assert_eq!(record.title, "Kodeks – gov.pl");
        assert_eq!(record.link, "https://ms.gov.pl/k");
        assert_eq!(record.snippet, "opis");
    }

    #[test]
    fn record_serializes_in_output_field_order() {
        let record = MatchRecord::from_result("a", SearchResult::new("b", "c", "d"));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"fraza":"a","title":"b","link":"c","snippet":"d"}"#
        );
    }

    #[test]
    fn result_set_appends_in_order() {
        let mut set = ResultSet::new();
        assert!(set.is_empty());

        set.extend(vec![MatchRecord::from_result(
            "one",
            SearchResult::new("", "https://a.gov.pl", ""),
        )]);
        set.extend(vec![MatchRecord::from_result(
            "two",
            SearchResult::new("", "https://a.gov.pl", ""),
        )]);

        let phrases: Vec<_> = set.records().iter().map(|r| r.fraza.as_str()).collect();
        assert_eq!(phrases, vec!["one", "two"]);
    }
}
