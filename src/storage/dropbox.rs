// file: src/storage/dropbox.rs
// description: Dropbox HTTP API v2 backend
// reference: https://www.dropbox.com/developers/documentation/http/documentation

use super::{RemoteFile, RemoteStorage, StorageError, StorageResult, candidate_names, file_name};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const API_URL: &str = "https://api.dropboxapi.com/2";
const CONTENT_URL: &str = "https://content.dropboxapi.com/2";

#[derive(Debug, Deserialize)]
struct AccountName {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    name: AccountName,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    path_display: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
enum Entry {
    File {
        name: String,
        path_display: Option<String>,
        size: u64,
        server_modified: Option<DateTime<Utc>>,
    },
    Folder {},
    Deleted {},
}

#[derive(Debug, Deserialize)]
struct ListFolderResult {
    entries: Vec<Entry>,
    cursor: String,
    has_more: bool,
}

#[derive(Debug, Serialize)]
struct UploadArg<'a> {
    path: &'a str,
    mode: &'a str,
    autorename: bool,
    mute: bool,
}

pub struct DropboxStorage {
    client: Client,
    token: String,
}

impl DropboxStorage {
    pub fn new(token: String, timeout_secs: u64) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, token })
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
        subject: &str,
    ) -> StorageResult<T> {
        debug!("Dropbox request {} for {}", endpoint, subject);

        let response = self
            .client
            .post(format!("{}/{}", API_URL, endpoint))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &text, subject));
        }

        Ok(response.json().await?)
    }

    async fn metadata(&self, path: &str) -> StorageResult<Metadata> {
        self.rpc("files/get_metadata", json!({ "path": path }), path)
            .await
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        match self.metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl RemoteStorage for DropboxStorage {
    fn provider_name(&self) -> &'static str {
        "Dropbox"
    }

    async fn verify(&self) -> StorageResult<String> {
        let response = self
            .client
            .post(format!("{}/users/get_current_account", API_URL))
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &text, "account"));
        }

        let account: Account = response.json().await?;
        Ok(account.name.display_name)
    }

    async fn create_folder(&self, name: &str) -> StorageResult<String> {
        let path = folder_path(name);

        match self.metadata(&path).await {
            Ok(meta) => {
                debug!("Dropbox folder already exists: {}", path);
                Ok(meta.path_display.unwrap_or(path))
            }
            Err(e) if e.is_not_found() => {
                let _: serde_json::Value = self
                    .rpc(
                        "files/create_folder_v2",
                        json!({ "path": path, "autorename": false }),
                        &path,
                    )
                    .await?;
                info!("Created Dropbox folder {}", path);
                Ok(path)
            }
            Err(e) => Err(e),
        }
    }

    async fn upload(&self, local: &Path, folder: &str) -> StorageResult<String> {
        let name = file_name(local)?;
        let contents = tokio::fs::read(local).await?;

        let mut target = None;
        for candidate in candidate_names(&name) {
            let path = format!("{}/{}", folder.trim_end_matches('/'), candidate);
            if !self.exists(&path).await? {
                target = Some(path);
                break;
            }
        }
        let target = target.ok_or_else(|| StorageError::NotFound(name.clone()))?;

        let arg = UploadArg {
            path: &target,
            mode: "add",
            autorename: false,
            mute: false,
        };
        let arg = serde_json::to_string(&arg).map_err(|e| StorageError::Decode(e.to_string()))?;

        let response = self
            .client
            .post(format!("{}/files/upload", CONTENT_URL))
            .bearer_auth(&self.token)
            .header("Dropbox-API-Arg", header_safe_json(&arg))
            .header("Content-Type", "application/octet-stream")
            .body(contents)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &text, &target));
        }

        let meta: Metadata = response.json().await?;
        info!("Uploaded {} to Dropbox", target);
        Ok(meta.path_display.unwrap_or(target))
    }

    async fn list(&self, folder: &str) -> StorageResult<Vec<RemoteFile>> {
        let mut page: ListFolderResult = self
            .rpc("files/list_folder", json!({ "path": folder }), folder)
            .await?;
        let mut files = Vec::new();

        loop {
            files.extend(page.entries.into_iter().filter_map(|entry| match entry {
                Entry::File {
                    name,
                    path_display,
                    size,
                    server_modified,
                } => Some(RemoteFile {
                    path: path_display.unwrap_or_else(|| format!("{}/{}", folder, name)),
                    name,
                    size,
                    modified: server_modified,
                }),
                _ => None,
            }));

            if !page.has_more {
                break;
            }
            page = self
                .rpc(
                    "files/list_folder/continue",
                    json!({ "cursor": page.cursor }),
                    folder,
                )
                .await?;
        }

        debug!("Listed {} Dropbox files in {}", files.len(), folder);
        Ok(files)
    }
}

fn folder_path(name: &str) -> String {
    format!("/{}", name.trim_matches('/'))
}

/// Map a failed API response onto the error variants callers branch on.
/// Dropbox reports endpoint errors as 409 with an `error_summary` such as
/// `path/not_found/..`.
pub fn classify_error(status: u16, body: &str, subject: &str) -> StorageError {
    if status == 401 {
        return StorageError::Unauthorized;
    }

    if status == 409 {
        let summary = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error_summary").and_then(|s| s.as_str()).map(String::from))
            .unwrap_or_default();
        if summary.contains("not_found") {
            return StorageError::NotFound(subject.to_string());
        }
    }

    StorageError::Http {
        status,
        body: body.to_string(),
    }
}

/// HTTP header values must be ASCII; escape everything else as JSON
/// `\uXXXX` sequences.
pub fn header_safe_json(json: &str) -> String {
    let mut output = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            output.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                output.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    output
}
