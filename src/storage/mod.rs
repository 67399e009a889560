// file: src/storage/mod.rs
// description: local document folder and remote storage backends
// reference: https://docs.rs/reqwest

pub mod drive;
pub mod dropbox;
pub mod local;

use crate::config::{RemoteConfig, RemoteProvider};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub use drive::DriveStorage;
pub use dropbox::DropboxStorage;
pub use local::{DocumentStore, FolderStats, StoredFile};

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access token was rejected")]
    Unauthorized,

    #[error("Request failed with status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    /// Provider path; Drive has no paths and reports the file id instead
    pub path: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Split `name` into stem and extension (with its dot). A leading dot does
/// not start an extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if name[..index].chars().any(|c| c != '.') => name.split_at(index),
        _ => (name, ""),
    }
}

/// `name`, then `stem_1.ext`, `stem_2.ext`, ... without end.
pub fn candidate_names(name: &str) -> impl Iterator<Item = String> + '_ {
    let (stem, extension) = split_extension(name);
    std::iter::once(name.to_string())
        .chain((1u64..).map(move |counter| format!("{}_{}{}", stem, counter, extension)))
}

/// First candidate name for which `exists` is false.
pub fn unique_name(name: &str, mut exists: impl FnMut(&str) -> bool) -> String {
    candidate_names(name)
        .find(|candidate| !exists(candidate))
        .unwrap_or_else(|| name.to_string())
}

pub(crate) fn file_name(path: &Path) -> StorageResult<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| StorageError::NotFound(path.display().to_string()))
}

/// A cloud storage provider holding a mirror of the document folder.
#[allow(async_fn_in_trait)]
pub trait RemoteStorage {
    fn provider_name(&self) -> &'static str;

    /// Check the access token; returns the account display name.
    async fn verify(&self) -> StorageResult<String>;

    /// Return the folder handle, creating the folder if it does not exist.
    async fn create_folder(&self, name: &str) -> StorageResult<String>;

    /// Upload a local file into `folder` without overwriting; a clashing
    /// name gets a numeric suffix. Returns the stored path or id.
    async fn upload(&self, local: &Path, folder: &str) -> StorageResult<String>;

    /// Files (not folders) directly inside `folder`.
    async fn list(&self, folder: &str) -> StorageResult<Vec<RemoteFile>>;
}

pub enum RemoteBackend {
    Dropbox(DropboxStorage),
    Drive(DriveStorage),
}

impl RemoteBackend {
    /// Backend for the configured provider, or `None` when remote mirroring
    /// is disabled.
    pub fn from_config(config: &RemoteConfig, timeout_secs: u64) -> StorageResult<Option<Self>> {
        let token = |token: &Option<String>| {
            token
                .clone()
                .filter(|t| !t.trim().is_empty())
                .ok_or(StorageError::Unauthorized)
        };

        match config.provider {
            RemoteProvider::None => Ok(None),
            RemoteProvider::Dropbox => Ok(Some(Self::Dropbox(DropboxStorage::new(
                token(&config.dropbox_token)?,
                timeout_secs,
            )?))),
            RemoteProvider::GoogleDrive => Ok(Some(Self::Drive(DriveStorage::new(
                token(&config.drive_token)?,
                timeout_secs,
            )?))),
        }
    }
}

impl RemoteStorage for RemoteBackend {
    fn provider_name(&self) -> &'static str {
        match self {
            Self::Dropbox(storage) => storage.provider_name(),
            Self::Drive(storage) => storage.provider_name(),
        }
    }

    async fn verify(&self) -> StorageResult<String> {
        match self {
            Self::Dropbox(storage) => storage.verify().await,
            Self::Drive(storage) => storage.verify().await,
        }
    }

    async fn create_folder(&self, name: &str) -> StorageResult<String> {
        match self {
            Self::Dropbox(storage) => storage.create_folder(name).await,
            Self::Drive(storage) => storage.create_folder(name).await,
        }
    }

    async fn upload(&self, local: &Path, folder: &str) -> StorageResult<String> {
        match self {
            Self::Dropbox(storage) => storage.upload(local, folder).await,
            Self::Drive(storage) => storage.upload(local, folder).await,
        }
    }

    async fn list(&self, folder: &str) -> StorageResult<Vec<RemoteFile>> {
        match self {
            Self::Dropbox(storage) => storage.list(folder).await,
            Self::Drive(storage) => storage.list(folder).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("report.pdf"), ("report", ".pdf"));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_extension("README"), ("README", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_unique_name_suffixes() {
        let taken: HashSet<&str> = ["paper.pdf", "paper_1.pdf"].into_iter().collect();
        assert_eq!(unique_name("paper.pdf", |n| taken.contains(n)), "paper_2.pdf");
        assert_eq!(unique_name("notes.docx", |n| taken.contains(n)), "notes.docx");
    }

    #[test]
    fn test_candidate_names_order() {
        let names: Vec<String> = candidate_names("a.pdf").take(3).collect();
        assert_eq!(names, vec!["a.pdf", "a_1.pdf", "a_2.pdf"]);
    }

    #[test]
    fn test_backend_disabled_by_default() {
        let backend = RemoteBackend::from_config(&RemoteConfig::default(), 30).unwrap();
        assert!(backend.is_none());
    }

    #[test]
    fn test_backend_requires_token() {
        let config = RemoteConfig {
            provider: RemoteProvider::Dropbox,
            dropbox_token: Some("  ".to_string()),
            ..RemoteConfig::default()
        };
        assert!(matches!(
            RemoteBackend::from_config(&config, 30),
            Err(StorageError::Unauthorized)
        ));
    }

    #[test]
    fn test_backend_selects_provider() {
        let config = RemoteConfig {
            provider: RemoteProvider::GoogleDrive,
            drive_token: Some("token".to_string()),
            ..RemoteConfig::default()
        };
        let backend = RemoteBackend::from_config(&config, 30).unwrap().unwrap();
        assert_eq!(backend.provider_name(), "Google Drive");
    }
}
