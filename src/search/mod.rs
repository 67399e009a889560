// file: src/search/mod.rs
// description: keyword search and highlighting module exports
// reference: internal module structure

pub mod highlight;
pub mod matcher;

pub use highlight::{Highlighter, highlight_text};
pub use matcher::{KeywordMatcher, find_matches, search_document};

use crate::models::SearchResult;

/// Standalone HTML page with the highlighted full text of each matching
/// document. Document text is inserted as-is.
pub fn render_html_report(results: &[(String, SearchResult)], highlighter: &Highlighter) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Search results</title></head>\n<body>\n",
    );

    for (name, result) in results {
        html.push_str(&format!(
            "<details>\n<summary>{} ({} matches)</summary>\n<div style=\"white-space: pre-wrap;\">",
            name,
            result.match_count()
        ));
        html.push_str(&highlighter.highlight(&result.full_text, &result.keyword));
        html.push_str("</div>\n</details>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundaryCapture;
    use crate::models::{DocumentFormat, ExtractedDocument};

    #[test]
    fn test_report_highlights_each_document() {
        let doc = ExtractedDocument::new(DocumentFormat::Pdf, vec!["The cat sat.".to_string()]);
        let result = find_matches(&doc, "cat", BoundaryCapture::Exclude);

        let html = render_html_report(&[("pets.pdf".to_string(), result)], &Highlighter::mark());
        assert!(html.contains("pets.pdf (1 matches)"));
        assert!(html.contains("The <mark>cat</mark> sat."));
    }
}
