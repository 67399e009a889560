// file: src/search/matcher.rs
// description: per-unit keyword matching with positional bookkeeping
// reference: https://docs.rs/regex

use crate::config::BoundaryCapture;
use crate::error::{AnalyticsError, Result};
use crate::models::{ExtractedDocument, Match, MatchLocation, SearchResult};
use crate::reader::DocumentReader;
use crate::utils::OperationTimer;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info, warn};

/// Case-insensitive matcher for a literal keyword that must be flanked by a
/// non-word character or the start/end of the unit. The flanking characters
/// are consumed by the pattern, so a character shared by two neighbouring
/// occurrences only serves the first one.
pub struct KeywordMatcher {
    pattern: Regex,
    capture: BoundaryCapture,
}

impl KeywordMatcher {
    pub fn new(keyword: &str, capture: BoundaryCapture) -> Result<Self> {
        let source = format!(r"(?i)(?:^|\W)({})(?:\W|$)", regex::escape(keyword));
        debug!("Using pattern: {}", source);

        let pattern = Regex::new(&source)
            .map_err(|e| AnalyticsError::Validation(format!("Invalid search keyword: {}", e)))?;

        Ok(Self { pattern, capture })
    }

    /// Matches within one unit, offsets in characters relative to the unit.
    pub fn find_in_unit(&self, unit: &str, location: MatchLocation) -> Vec<Match> {
        let mut cursor = CharCursor::new(unit);

        self.pattern
            .captures_iter(unit)
            .filter_map(|caps| {
                let span = match self.capture {
                    BoundaryCapture::Consume => caps.get(0),
                    BoundaryCapture::Exclude => caps.get(1),
                }?;

                Some(Match {
                    location,
                    start: cursor.advance_to(span.start()),
                    end: cursor.advance_to(span.end()),
                    text: span.as_str().to_string(),
                })
            })
            .collect()
    }

    pub fn find_all(&self, document: &ExtractedDocument) -> Vec<Match> {
        let paginated = document.format.is_paginated();

        document
            .units
            .iter()
            .enumerate()
            .flat_map(|(index, unit)| {
                let location = if paginated {
                    MatchLocation::Page(index + 1)
                } else {
                    MatchLocation::Paragraph(index + 1)
                };
                self.find_in_unit(unit, location)
            })
            .collect()
    }
}

/// Converts ascending byte offsets to character offsets in one pass over
/// the text.
struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    /// `byte_offset` must lie on a char boundary at or after the previous one.
    fn advance_to(&mut self, byte_offset: usize) -> usize {
        self.chars += self.text[self.byte..byte_offset].chars().count();
        self.byte = byte_offset;
        self.chars
    }
}

/// Every occurrence of `keyword` in an already extracted document. An empty
/// keyword matches nothing.
pub fn find_matches(
    document: &ExtractedDocument,
    keyword: &str,
    capture: BoundaryCapture,
) -> SearchResult {
    let full_text = document.full_text();

    if keyword.is_empty() {
        return SearchResult::new(full_text, Vec::new(), keyword);
    }

    match KeywordMatcher::new(keyword, capture) {
        Ok(matcher) => SearchResult::new(full_text, matcher.find_all(document), keyword),
        Err(e) => {
            warn!("Cannot search for {:?}: {}", keyword, e);
            SearchResult::new(full_text, Vec::new(), keyword)
        }
    }
}

/// Read `path` and search it. Extraction failures are logged and produce an
/// empty, not-found result.
pub fn search_document<R: DocumentReader + ?Sized>(
    reader: &R,
    path: &Path,
    keyword: &str,
    capture: BoundaryCapture,
) -> SearchResult {
    info!("Searching {} for: {}", path.display(), keyword);
    let timer = OperationTimer::quiet("keyword search");

    let document = match reader.read(path) {
        Ok(document) => document,
        Err(e) => {
            warn!("Error searching file {}: {}", path.display(), e);
            return SearchResult::empty(keyword);
        }
    };

    let result = find_matches(&document, keyword, capture);
    info!(
        "Search completed in {:.2} seconds, {} matches found.",
        timer.elapsed().as_secs_f64(),
        result.match_count()
    );
    result
}
