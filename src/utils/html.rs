//! HTML text utilities.

use scraper::{Html, Selector};

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the visible text of a page's `<body>`, whitespace-normalized.
///
/// Falls back to the whole document when no body element exists.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    let root = body.unwrap_or_else(|| document.root_element());

    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }

    normalize_whitespace(&parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Plan \n\t działania  "), "Plan działania");
        assert_eq!(normalize_whitespace(""), "");
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let html = r#"<html><head><title>T</title><style>.x{}</style></head>
            <body><h1>Historia   Polski</h1><script>var Plan = 1;</script>
            <p>Plan
            działania</p></body></html>"#;
        assert_eq!(visible_text(html), "Historia Polski Plan działania");
    }

    #[test]
    fn test_visible_text_without_body_markup() {
        assert_eq!(visible_text("just text"), "just text");
    }
}
