// file: src/reader/mod.rs
// description: document text and title extraction for supported formats
// reference: internal module structure

pub mod docx;
pub mod pdf;

use crate::error::{AnalyticsError, Result};
use crate::models::{DocumentFormat, ExtractedDocument};
use std::path::Path;
use tracing::debug;

pub const NO_TITLE: &str = "No Title";

/// Source of plain text and titles for documents on disk.
pub trait DocumentReader {
    fn read(&self, path: &Path) -> Result<ExtractedDocument>;

    fn title(&self, path: &Path) -> Result<String>;
}

#[derive(Debug, Clone, Copy)]
pub struct FileDocumentReader {
    title_min_chars: usize,
}

impl FileDocumentReader {
    pub fn new(title_min_chars: usize) -> Self {
        Self { title_min_chars }
    }
}

impl Default for FileDocumentReader {
    fn default() -> Self {
        Self::new(10)
    }
}

impl DocumentReader for FileDocumentReader {
    fn read(&self, path: &Path) -> Result<ExtractedDocument> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| AnalyticsError::UnsupportedFormat(path.to_path_buf()))?;

        debug!("Reading {:?} document: {}", format, path.display());

        let units = match format {
            DocumentFormat::Pdf => pdf::read_pages(path)?,
            DocumentFormat::Docx => docx::read_paragraphs(path)?
                .into_iter()
                .map(|mut paragraph| {
                    paragraph.push('\n');
                    paragraph
                })
                .collect(),
        };

        Ok(ExtractedDocument::new(format, units))
    }

    fn title(&self, path: &Path) -> Result<String> {
        let document = self.read(path)?;
        Ok(extract_title(&document, self.title_min_chars))
    }
}

/// First trimmed line (PDF) or paragraph (DOCX) longer than `min_chars`
/// characters, or [`NO_TITLE`].
pub fn extract_title(document: &ExtractedDocument, min_chars: usize) -> String {
    let is_title = |candidate: &str| candidate.chars().count() > min_chars;

    let found = match document.format {
        DocumentFormat::Pdf => document
            .units
            .iter()
            .flat_map(|page| page.trim().split('\n'))
            .map(str::trim)
            .find(|line| is_title(line)),
        DocumentFormat::Docx => document
            .units
            .iter()
            .map(|paragraph| paragraph.trim())
            .find(|paragraph| is_title(paragraph)),
    };

    found
        .map(str::to_string)
        .unwrap_or_else(|| NO_TITLE.to_string())
}
