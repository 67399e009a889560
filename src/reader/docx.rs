// file: src/reader/docx.rs
// description: paragraph extraction from Office Open XML word documents
// reference: https://docs.rs/zip, https://docs.rs/xml-rs

use crate::error::{AnalyticsError, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use xml::reader::{EventReader, XmlEvent};
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";

/// Text of each top-level body paragraph, in document order. Paragraphs
/// nested in tables, text boxes or content controls are not body paragraphs.
pub fn read_paragraphs(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|source| AnalyticsError::FileOperation {
        path: path.to_path_buf(),
        source,
    })?;

    paragraphs_from_archive(file).map_err(|message| AnalyticsError::extraction(path, message))
}

pub fn paragraphs_from_archive<R: Read + Seek>(reader: R) -> std::result::Result<Vec<String>, String> {
    let mut archive = ZipArchive::new(reader).map_err(|e| format!("not a docx archive: {}", e))?;
    let part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| format!("missing {}: {}", DOCUMENT_PART, e))?;

    parse_document_xml(BufReader::new(part))
}

fn parse_document_xml<R: Read>(source: R) -> std::result::Result<Vec<String>, String> {
    let mut paragraphs = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    for event in EventReader::new(source) {
        match event.map_err(|e| format!("malformed document xml: {}", e))? {
            XmlEvent::StartElement { name, .. } => {
                let local = name.local_name;
                let nested_paragraphs = stack.iter().filter(|n| n.as_str() == "p").count();

                if local == "p" && stack.last().map(String::as_str) == Some("body") {
                    current = Some(String::new());
                } else if nested_paragraphs == 1 && current.is_some() {
                    match local.as_str() {
                        "t" => in_text = true,
                        "tab" => push_text(&mut current, "\t"),
                        "br" | "cr" => push_text(&mut current, "\n"),
                        _ => {}
                    }
                }

                stack.push(local);
            }
            XmlEvent::EndElement { .. } => {
                if let Some(local) = stack.pop() {
                    match local.as_str() {
                        "t" => in_text = false,
                        "p" if stack.last().map(String::as_str) == Some("body") => {
                            if let Some(text) = current.take() {
                                paragraphs.push(text);
                            }
                        }
                        _ => {}
                    }
                }
            }
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) if in_text => {
                let depth = stack.iter().filter(|n| n.as_str() == "p").count();
                if depth == 1 {
                    push_text(&mut current, &text);
                }
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_text(current: &mut Option<String>, text: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}
