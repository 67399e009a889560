// file: src/classifier/artifact.rs
// description: persisted vectorizer and model bundle
// reference: metadata persistence with serde_json

use super::naive_bayes::MultinomialNb;
use super::vectorizer::TfidfVectorizer;
use crate::error::{AnalyticsError, Result};
use crate::models::CategoryLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A fitted vectorizer and model, usable on its own to label new text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub trained_at: DateTime<Utc>,
    /// SHA-256 over the training corpus texts
    pub corpus_digest: String,
    pub vectorizer: TfidfVectorizer,
    pub model: MultinomialNb,
}

impl ModelArtifact {
    pub fn new(corpus: &[&str], vectorizer: TfidfVectorizer, model: MultinomialNb) -> Self {
        Self {
            trained_at: Utc::now(),
            corpus_digest: corpus_digest(corpus),
            vectorizer,
            model,
        }
    }

    pub fn predict(&self, text: &str) -> CategoryLabel {
        self.model.predict(&self.vectorizer.transform(text))
    }
}

pub fn corpus_digest(corpus: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for text in corpus {
        hasher.update(text.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

/// Destination for trained models.
pub trait ArtifactSink {
    fn persist(&self, artifact: &ModelArtifact) -> Result<()>;
}

/// Writes the artifact as JSON to a fixed path, replacing the previous one.
/// Each write goes to its own temporary file in the target directory and is
/// renamed into place, so a reader never observes a partially written
/// artifact, even with several writers.
pub struct FileArtifactStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn load(&self) -> Result<ModelArtifact> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            AnalyticsError::Artifact(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            AnalyticsError::Artifact(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }
}

impl ArtifactSink for FileArtifactStore {
    fn persist(&self, artifact: &ModelArtifact) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| AnalyticsError::Artifact("artifact write lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                AnalyticsError::Artifact(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let contents = serde_json::to_string(artifact)
            .map_err(|e| AnalyticsError::Artifact(format!("Failed to serialize model: {}", e)))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
            AnalyticsError::Artifact(format!("Failed to create temp file in {}: {}", dir.display(), e))
        })?;
        temp.write_all(contents.as_bytes()).map_err(|e| {
            AnalyticsError::Artifact(format!("Failed to write {}: {}", temp.path().display(), e))
        })?;
        temp.persist(&self.path).map_err(|e| {
            AnalyticsError::Artifact(format!(
                "Failed to replace {}: {}",
                self.path.display(),
                e.error
            ))
        })?;

        debug!("Model digest {}", artifact.corpus_digest);
        info!("Saved classifier model to {}", self.path.display());
        Ok(())
    }
}
