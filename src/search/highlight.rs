// file: src/search/highlight.rs
// description: whole-word keyword highlighting with inline markup
// reference: https://docs.rs/regex

use regex::Regex;
use tracing::warn;

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#ADD8E6";

/// Wraps whole-word, case-insensitive keyword occurrences in markup. The
/// input text is not escaped: markup already present in it passes through
/// verbatim, so untrusted documents can inject markup into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    open: String,
    close: String,
}

impl Highlighter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// `<span>` with a background colour, the form rendered by the HTML report.
    pub fn with_color(color: &str) -> Self {
        Self::new(
            format!("<span style=\"background-color: {};\">", color),
            "</span>",
        )
    }

    pub fn mark() -> Self {
        Self::new("<mark>", "</mark>")
    }

    pub fn highlight(&self, text: &str, keyword: &str) -> String {
        if keyword.is_empty() {
            return text.to_string();
        }

        let pattern = match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword))) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!("Cannot highlight {:?}: {}", keyword, e);
                return text.to_string();
            }
        };

        let mut highlighted = String::with_capacity(text.len());
        let mut last_end = 0;

        for found in pattern.find_iter(text) {
            highlighted.push_str(&text[last_end..found.start()]);
            highlighted.push_str(&self.open);
            highlighted.push_str(found.as_str());
            highlighted.push_str(&self.close);
            last_end = found.end();
        }

        highlighted.push_str(&text[last_end..]);
        highlighted
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::with_color(DEFAULT_HIGHLIGHT_COLOR)
    }
}

/// Highlight with the default background-colour span.
pub fn highlight_text(text: &str, keyword: &str) -> String {
    Highlighter::default().highlight(text, keyword)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mark_wrapper() {
        assert_eq!(
            Highlighter::mark().highlight("The cat sat.", "cat"),
            "The <mark>cat</mark> sat."
        );
    }

    #[test]
    fn test_default_span() {
        assert_eq!(
            highlight_text("a Cat", "cat"),
            "a <span style=\"background-color: #ADD8E6;\">Cat</span>"
        );
    }

    #[test]
    fn test_empty_keyword_is_identity() {
        let text = "anything <b>at all</b>";
        assert_eq!(highlight_text(text, ""), text);
        assert_eq!(Highlighter::mark().highlight("", ""), "");
    }

    #[test]
    fn test_whole_words_only() {
        assert_eq!(
            Highlighter::mark().highlight("cat concatenate cats cat", "cat"),
            "<mark>cat</mark> concatenate cats <mark>cat</mark>"
        );
    }

    #[test]
    fn test_adjacent_occurrences_share_no_characters() {
        assert_eq!(
            Highlighter::mark().highlight("cat cat", "cat"),
            "<mark>cat</mark> <mark>cat</mark>"
        );
    }

    #[test]
    fn test_unwrapping_reconstructs_input() {
        let text = "Line one has the keyword.\nLine two, with <i>markup</i>, does not.";
        let highlighted = Highlighter::mark().highlight(text, "keyword");

        assert_eq!(highlighted.matches("<mark>").count(), 1);
        assert_eq!(highlighted.replace("<mark>", "").replace("</mark>", ""), text);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert_eq!(
            Highlighter::mark().highlight("a.b axb", "a.b"),
            "<mark>a.b</mark> axb"
        );
    }

    #[test]
    fn test_keyword_ending_in_symbol_is_not_wrapped() {
        let text = "I write C++ daily.";
        assert_eq!(Highlighter::mark().highlight(text, "C++"), text);
        assert_eq!(
            Highlighter::mark().highlight("C and C++", "C"),
            "<mark>C</mark> and <mark>C</mark>++"
        );
    }

    #[test]
    fn test_deterministic() {
        let highlighter = Highlighter::mark();
        assert_eq!(
            highlighter.highlight("Data data DATA", "data"),
            highlighter.highlight("Data data DATA", "data")
        );
    }
}
