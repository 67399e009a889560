// file: src/storage/local.rs
// description: the local document folder
// reference: https://docs.rs/walkdir

use super::unique_name;
use crate::error::{AnalyticsError, Result};
use crate::models::DocumentFormat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl StoredFile {
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_name(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderStats {
    pub document_count: usize,
    pub total_bytes: u64,
}

impl FolderStats {
    pub fn total_kb(&self) -> f64 {
        self.total_bytes as f64 / 1024.0
    }
}

/// Flat folder of uploaded and fetched documents.
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure_folder(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| AnalyticsError::FileOperation {
            path: self.root.clone(),
            source,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }

    /// Store `bytes` as `name`, or as `name_1.ext`, `name_2.ext`, ... when
    /// the name is taken. Returns the path written.
    pub fn save_unique(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.ensure_folder()?;
        let target = unique_name(name, |candidate| self.contains(candidate));
        self.write(&target, bytes)
    }

    /// Store `bytes` as `name`, replacing any existing file.
    pub fn save_overwrite(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.ensure_folder()?;
        self.write(name, bytes)
    }

    /// Copy a file from elsewhere on disk, keeping its name.
    pub fn import(&self, source: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AnalyticsError::Validation(format!("No file name: {}", source.display())))?;
        let bytes = fs::read(source).map_err(|e| AnalyticsError::FileOperation {
            path: source.to_path_buf(),
            source: e,
        })?;
        self.save_overwrite(name, &bytes)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, bytes).map_err(|source| AnalyticsError::FileOperation {
            path: path.clone(),
            source,
        })?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Regular files directly inside the folder, sorted by name. A missing
    /// folder has no entries.
    pub fn list(&self) -> Result<Vec<StoredFile>> {
        if !self.root.exists() {
            debug!("Document folder does not exist: {}", self.root.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                continue;
            };

            let metadata = entry.metadata().map_err(|e| AnalyticsError::FileOperation {
                path: entry.path().to_path_buf(),
                source: e.into(),
            })?;

            files.push(StoredFile {
                name: name.to_string(),
                path: entry.path().to_path_buf(),
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Entries whose names carry a supported document extension.
    pub fn documents(&self) -> Result<Vec<StoredFile>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|file| file.format().is_some())
            .collect())
    }

    /// Count and total size of every file in the folder.
    pub fn stats(&self) -> Result<FolderStats> {
        let files = self.list()?;
        Ok(FolderStats {
            document_count: files.len(),
            total_bytes: files.iter().map(|f| f.size).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_save_unique_suffixes() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("docs"));

        let first = store.save_unique("paper.pdf", b"one").unwrap();
        let second = store.save_unique("paper.pdf", b"two").unwrap();
        let third = store.save_unique("paper.pdf", b"three").unwrap();

        assert_eq!(first.file_name().unwrap(), "paper.pdf");
        assert_eq!(second.file_name().unwrap(), "paper_1.pdf");
        assert_eq!(third.file_name().unwrap(), "paper_2.pdf");
        assert_eq!(fs::read(&first).unwrap(), b"one");
    }

    #[test]
    fn test_save_overwrite_replaces() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path());

        store.save_overwrite("a.docx", b"old").unwrap();
        let path = store.save_overwrite("a.docx", b"new").unwrap();

        assert_eq!(fs::read(path).unwrap(), b"new");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_list_and_documents() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        store.save_overwrite("b.pdf", b"12345").unwrap();
        store.save_overwrite("a.docx", b"123").unwrap();
        store.save_overwrite("notes.txt", b"1").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.pdf"), b"x").unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["a.docx", "b.pdf", "notes.txt"]);

        let docs: Vec<String> = store
            .documents()
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(docs, vec!["a.docx", "b.pdf"]);
    }

    #[test]
    fn test_stats() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path());
        store.save_overwrite("a.pdf", &[0u8; 1024]).unwrap();
        store.save_overwrite("b.pdf", &[0u8; 512]).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.total_bytes, 1536);
        assert_eq!(stats.total_kb(), 1.5);
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.stats().unwrap(), FolderStats::default());
    }

    #[test]
    fn test_import_keeps_name() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.pdf");
        fs::write(&source, b"pdf").unwrap();

        let store = DocumentStore::new(dir.path().join("docs"));
        let path = store.import(&source).unwrap();
        assert_eq!(path, dir.path().join("docs/source.pdf"));
    }
}
