//! Search query builder.
//!
//! Builds provider query strings with an optional `site:` restriction.

/// Builder for constructing search queries.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    /// Free-text search terms.
    terms: Vec<String>,
    /// Target domain for site: restriction.
    site: Option<String>,
}

impl QueryBuilder {
    /// Create a new query builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search term.
    pub fn term(mut self, term: &str) -> Self {
        let term = term.trim();
        if !term.is_empty() {
            self.terms.push(term.to_string());
        }
        self
    }

    /// Restrict search to a specific domain.
    pub fn site(mut self, domain: &str) -> Self {
        let domain = domain.trim();
        if !domain.is_empty() {
            self.site = Some(domain.to_string());
        }
        self
    }

    /// Build the final query string. The site restriction goes last.
    pub fn build(&self) -> String {
        let mut parts: Vec<String> = self.terms.clone();

        if let Some(ref site) = self.site {
            parts.push(format!("site:{}", site));
        }

        parts.join(" ")
    }
}
