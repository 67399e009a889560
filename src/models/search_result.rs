// file: src/models/search_result.rs
// description: keyword match and document search result models
// reference: Used for keyword search results

use serde::{Deserialize, Serialize};

/// Where a match was found. Pages and paragraphs are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchLocation {
    Page(usize),
    Paragraph(usize),
}

impl MatchLocation {
    pub fn number(&self) -> usize {
        match self {
            Self::Page(n) | Self::Paragraph(n) => *n,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Page(n) => format!("page {}", n),
            Self::Paragraph(n) => format!("paragraph {}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub location: MatchLocation,

    /// Character offset of the match within its unit
    pub start: usize,

    /// Character offset one past the end of the match within its unit
    pub end: usize,

    /// Matched text as it appears in the unit
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub found: bool,

    /// Complete extracted text, used for the highlighting pass
    pub full_text: String,

    /// Matches in unit order, then left to right
    pub matches: Vec<Match>,

    /// The query exactly as the caller supplied it
    pub keyword: String,
}

impl SearchResult {
    pub fn new(full_text: String, matches: Vec<Match>, keyword: &str) -> Self {
        Self {
            found: !matches.is_empty(),
            full_text,
            matches,
            keyword: keyword.to_string(),
        }
    }

    /// Result for a document whose text could not be extracted.
    pub fn empty(keyword: &str) -> Self {
        Self::new(String::new(), Vec::new(), keyword)
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Format as a summary string for display
    pub fn format_summary(&self, max_matches: usize) -> String {
        let mut summary = format!("{} match(es) for \"{}\"", self.matches.len(), self.keyword);

        for m in self.matches.iter().take(max_matches) {
            summary.push_str(&format!(
                "\n  {} [{}..{}] {:?}",
                m.location.describe(),
                m.start,
                m.end,
                m.text
            ));
        }

        if self.matches.len() > max_matches {
            summary.push_str(&format!("\n  ... {} more", self.matches.len() - max_matches));
        }

        summary
    }
}
