//! Page-level phrase verification.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::filter::{phrase_matches, MatchMode};
use crate::render::PageRenderer;
use crate::utils::visible_text;

/// Outcome of checking one page for one phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Match,
    NoMatch,
    /// The page could not be fetched or was not HTML.
    Inconclusive(String),
}

impl Verification {
    pub fn is_match(&self) -> bool {
        matches!(self, Verification::Match)
    }
}

/// Confirms that a phrase appears in the visible text of a page.
#[async_trait]
pub trait PhraseVerifier: Send + Sync {
    async fn check(&self, url: &str, phrase: &str) -> Verification;

    /// Boolean form of `check`. Inconclusive counts as not found.
    async fn verify(&self, url: &str, phrase: &str) -> bool {
        self.check(url, phrase).await.is_match()
    }
}

/// Verifier that renders the page and matches against its body text.
pub struct RenderedPageVerifier {
    renderer: Arc<dyn PageRenderer>,
}

impl RenderedPageVerifier {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl PhraseVerifier for RenderedPageVerifier {
    async fn check(&self, url: &str, phrase: &str) -> Verification {
        let html = match self.renderer.render(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Verification inconclusive for {}: {}", url, e);
                return Verification::Inconclusive(e.to_string());
            }
        };

        let text = visible_text(&html);
        if phrase_matches(&text, phrase, MatchMode::WordBoundary) {
            debug!("Phrase \"{}\" found on {}", phrase, url);
            Verification::Match
        } else {
            debug!("Phrase \"{}\" not found on {}", phrase, url);
            Verification::NoMatch
        }
    }
}
