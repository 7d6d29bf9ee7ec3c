//! Result filtering.
//!
//! Filtering is pure: a list of criteria applied as a conjunction over search
//! results, preserving order. The verifier reuses `phrase_matches` for its
//! body-text check.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::SearchResult;
use crate::utils::normalize_whitespace;

/// Default target domain token.
pub const DEFAULT_DOMAIN: &str = "gov.pl";

/// How a phrase is compared against text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Case-insensitive containment.
    Substring,
    /// Case-insensitive, bounded by start/end of text or a non-alphanumeric
    /// character on each side.
    WordBoundary,
}

/// One predicate a search result must satisfy to be kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCriterion {
    /// The result link contains this domain token.
    Domain(String),
    /// The result title contains this phrase.
    Phrase { phrase: String, mode: MatchMode },
}

impl FilterCriterion {
    pub fn matches(&self, result: &SearchResult) -> bool {
        match self {
            FilterCriterion::Domain(domain) => link_matches_domain(&result.link, domain),
            FilterCriterion::Phrase { phrase, mode } => {
                phrase_matches(&result.title, phrase, *mode)
            }
        }
    }
}

/// Keep only results satisfying every criterion, in their original order.
pub fn filter(results: Vec<SearchResult>, criteria: &[FilterCriterion]) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|result| criteria.iter().all(|c| c.matches(result)))
        .collect()
}

/// Case-insensitive containment of the domain token in a link.
pub fn link_matches_domain(link: &str, domain: &str) -> bool {
    link.to_lowercase().contains(&domain.to_lowercase())
}

/// Test whether `phrase` occurs in `text` under `mode`.
///
/// Both sides are whitespace-normalized first. An empty phrase never matches.
pub fn phrase_matches(text: &str, phrase: &str, mode: MatchMode) -> bool {
    let phrase = normalize_whitespace(phrase);
    if phrase.is_empty() {
        return false;
    }
    let text = normalize_whitespace(text);

    match mode {
        MatchMode::Substring => text.to_lowercase().contains(&phrase.to_lowercase()),
        MatchMode::WordBoundary => match word_boundary_regex(&phrase) {
            Some(re) => re.is_match(&text),
            None => false,
        },
    }
}

fn word_boundary_regex(phrase: &str) -> Option<Regex> {
    let pattern = format!(
        r"(?i)(?:^|[^\p{{L}}\p{{N}}]){}(?:[^\p{{L}}\p{{N}}]|$)",
        regex::escape(phrase)
    );
    Regex::new(&pattern).ok()
}

/// Which filtering behavior a run applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Keep results whose link contains the target domain.
    #[default]
    Domain,
    /// Domain match plus the catalog title appearing in the result title.
    TitlePhrase,
    /// Domain match, then the catalog title must appear on the linked page.
    VerifiedPage,
}

impl FilterMode {
    /// Criteria applied to search results for one catalog title.
    pub fn criteria(&self, domain: &str, phrase: &str) -> Vec<FilterCriterion> {
        let mut criteria = vec![FilterCriterion::Domain(domain.to_string())];
        if *self == FilterMode::TitlePhrase {
            criteria.push(FilterCriterion::Phrase {
                phrase: phrase.to_string(),
                mode: MatchMode::Substring,
            });
        }
        criteria
    }

    pub fn verifies_pages(&self) -> bool {
        *self == FilterMode::VerifiedPage
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Domain => "domain",
            FilterMode::TitlePhrase => "title-phrase",
            FilterMode::VerifiedPage => "verified-page",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(title: &str, link: &str) -> SearchResult {
        SearchResult::new(title, link, "")
    }

    #[test]
    fn domain_filter_keeps_matching_links_in_order() {
        let results = vec![
            result("a", "https://www.gov.pl/web/kultura"),
            result("b", "https://example.com/gov"),
            result("c", "https://mkidn.GOV.PL/x"),
        ];
        let kept = filter(results, &[FilterCriterion::Domain("gov.pl".into())]);
        let titles: Vec<_> = kept.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["a", "c"]);
    }

    #[test]
    fn filter_output_is_subset_of_input() {
        let results = vec![
            result("Historia Polski", "https://gov.pl/1"),
            result("Inne", "https://gov.pl/2"),
            result("Historia Polski", "https://example.com/3"),
        ];
        let criteria = FilterMode::TitlePhrase.criteria("gov.pl", "historia polski");
        let kept = filter(results.clone(), &criteria);

        assert_eq!(kept.len(), 1);
        assert!(kept.iter().all(|r| results.contains(r)));
        assert_eq!(kept[0].link, "https://gov.pl/1");
    }

    #[test]
    fn empty_criteria_keep_everything() {
        let results = vec![result("a", "x"), result("b", "y")];
        assert_eq!(filter(results.clone(), &[]), results);
    }

    #[test]
    fn domain_token_is_not_a_strict_suffix_check() {
        assert!(link_matches_domain("https://www.gov.pl/web/a", "gov.pl"));
        assert!(!link_matches_domain("https://example.com/a", "gov.pl"));
    }

    #[test]
    fn word_boundary_rejects_prefix_of_longer_word() {
        assert!(phrase_matches("Plan działania na rok", "Plan", MatchMode::WordBoundary));
        assert!(!phrase_matches("Planowanie przestrzenne", "Plan", MatchMode::WordBoundary));
        assert!(phrase_matches("Planowanie przestrzenne", "Plan", MatchMode::Substring));
    }

    #[test]
    fn word_boundary_treats_polish_letters_as_word_characters() {
        assert!(!phrase_matches("Zażółć", "Zaż", MatchMode::WordBoundary));
        assert!(phrase_matches("(Zażółć gęślą jaźń)", "zażółć", MatchMode::WordBoundary));
        assert!(phrase_matches("KSIĄŻKI", "książki", MatchMode::Substring));
    }

    #[test]
    fn matching_normalizes_whitespace() {
        assert!(phrase_matches(
            "Dzieje\n   Polski  w zarysie",
            "Dzieje Polski\tw zarysie",
            MatchMode::WordBoundary
        ));
    }

    #[test]
    fn punctuation_in_phrase_is_literal() {
        assert!(phrase_matches("Tom 1 (1918-1939).", "Tom 1 (1918-1939)", MatchMode::WordBoundary));
        assert!(!phrase_matches("Tom 1 x1918-1939y", "Tom 1 (1918-1939)", MatchMode::WordBoundary));
    }

    #[test]
    fn empty_phrase_never_matches() {
        assert!(!phrase_matches("anything", "", MatchMode::Substring));
        assert!(!phrase_matches("anything", "   ", MatchMode::WordBoundary));
    }

    #[test]
    fn modes_build_expected_criteria() {
        assert_eq!(
            FilterMode::Domain.criteria("gov.pl", "x"),
            vec![FilterCriterion::Domain("gov.pl".into())]
        );
        assert_eq!(FilterMode::TitlePhrase.criteria("gov.pl", "x").len(), 2);
        assert_eq!(FilterMode::VerifiedPage.criteria("gov.pl", "x").len(), 1);
        assert!(FilterMode::VerifiedPage.verifies_pages());
        assert!(!FilterMode::TitlePhrase.verifies_pages());
    }
}
