// file: src/models/document.rs
// description: supported document formats and extracted text units
// reference: internal data structures

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Page-oriented documents (`.pdf`).
    Pdf,
    /// Paragraph-oriented documents (`.docx`).
    Docx,
}

impl DocumentFormat {
    /// Detect the format from the file name. Anything other than a
    /// `.pdf` or `.docx` suffix is unsupported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::from_name(name)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if name.ends_with(".docx") {
            Some(Self::Docx)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn is_paginated(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

/// Plain text of a document, split into its logical units: one entry per
/// page for PDF, one entry per body paragraph (with its trailing `\n`) for
/// DOCX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub format: DocumentFormat,
    pub units: Vec<String>,
}

impl ExtractedDocument {
    pub fn new(format: DocumentFormat, units: Vec<String>) -> Self {
        Self { format, units }
    }

    pub fn full_text(&self) -> String {
        self.units.concat()
    }

    pub fn is_empty(&self) -> bool {
        self.units.iter().all(|unit| unit.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("/docs/report.pdf")),
            Some(DocumentFormat::Pdf)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("notes.docx")),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("notes.doc")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("readme.txt")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("REPORT.PDF")), None);
    }

    #[test]
    fn test_full_text_concatenates_units() {
        let doc = ExtractedDocument::new(
            DocumentFormat::Docx,
            vec!["First\n".to_string(), "Second\n".to_string()],
        );
        assert_eq!(doc.full_text(), "First\nSecond\n");
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_blank_document_is_empty() {
        let doc = ExtractedDocument::new(DocumentFormat::Pdf, vec!["  \n".to_string()]);
        assert!(doc.is_empty());
    }
}
