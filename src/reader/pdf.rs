// file: src/reader/pdf.rs
// description: page text extraction for pdf documents
// reference: https://docs.rs/lopdf

use crate::error::{AnalyticsError, Result};
use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// Text of every page in page order.
pub fn read_pages(path: &Path) -> Result<Vec<String>> {
    let document = Document::load(path).map_err(|e| AnalyticsError::extraction(path, e))?;
    pages_from_document(&document).map_err(|e| AnalyticsError::extraction(path, e))
}

fn pages_from_document(document: &Document) -> std::result::Result<Vec<String>, String> {
    let pages = document.get_pages();
    debug!("PDF has {} page(s)", pages.len());

    pages
        .keys()
        .map(|&page_number| {
            document
                .extract_text(&[page_number])
                .map_err(|e| format!("page {}: {}", page_number, e))
        })
        .collect()
}
