// file: src/storage/drive.rs
// description: Google Drive v3 REST backend using a caller-supplied bearer token
// reference: https://developers.google.com/drive/api/reference/rest/v3

use super::{RemoteFile, RemoteStorage, StorageError, StorageResult, file_name, unique_name};
use crate::models::DocumentFormat;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const ABOUT_URL: &str = "https://www.googleapis.com/drive/v3/about";
const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const MULTIPART_BOUNDARY: &str = "doc_analytics_upload_boundary";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveUser {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct About {
    user: DriveUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
    /// Drive encodes int64 values as JSON strings
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    modified_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

pub struct DriveStorage {
    client: Client,
    token: String,
}

impl DriveStorage {
    pub fn new(token: String, timeout_secs: u64) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, token })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, subject: &str) -> StorageResult<T> {
        let response = request.bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &text, subject));
        }

        Ok(response.json().await?)
    }

    async fn query(&self, q: &str, subject: &str) -> StorageResult<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![
                ("q", q.to_string()),
                (
                    "fields",
                    "nextPageToken,files(id,name,mimeType,size,modifiedTime)".to_string(),
                ),
            ];
            if let Some(token) = page_token.take() {
                params.push(("pageToken", token));
            }

            let page: FileList = self
                .send(self.client.get(FILES_URL).query(&params), subject)
                .await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(files)
    }
}

impl RemoteStorage for DriveStorage {
    fn provider_name(&self) -> &'static str {
        "Google Drive"
    }

    async fn verify(&self) -> StorageResult<String> {
        let about: About = self
            .send(
                self.client.get(ABOUT_URL).query(&[("fields", "user")]),
                "account",
            )
            .await?;
        Ok(about.user.display_name)
    }

    /// Returns the folder id.
    async fn create_folder(&self, name: &str) -> StorageResult<String> {
        let existing = self.query(&folder_query(name), name).await?;
        if let Some(folder) = existing.into_iter().next() {
            debug!("Drive folder already exists: {} ({})", name, folder.id);
            return Ok(folder.id);
        }

        let created: CreatedFile = self
            .send(
                self.client
                    .post(FILES_URL)
                    .query(&[("fields", "id")])
                    .json(&json!({ "name": name, "mimeType": FOLDER_MIME })),
                name,
            )
            .await?;
        info!("Created Drive folder {} ({})", name, created.id);
        Ok(created.id)
    }

    /// `folder` is a folder id. Returns the new file id.
    async fn upload(&self, local: &Path, folder: &str) -> StorageResult<String> {
        let name = file_name(local)?;
        let contents = tokio::fs::read(local).await?;

        let taken: HashSet<String> = self
            .query(&children_query(folder), folder)
            .await?
            .into_iter()
            .map(|f| f.name)
            .collect();
        let target = unique_name(&name, |candidate| taken.contains(candidate));

        let metadata = json!({ "name": target, "parents": [folder] });
        let body = multipart_related_body(
            MULTIPART_BOUNDARY,
            &metadata,
            upload_mime_type(&name),
            &contents,
        );

        let created: CreatedFile = self
            .send(
                self.client
                    .post(UPLOAD_URL)
                    .query(&[("uploadType", "multipart"), ("fields", "id")])
                    .header(
                        "Content-Type",
                        format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
                    )
                    .body(body),
                &target,
            )
            .await?;

        info!("Uploaded {} to Google Drive ({})", target, created.id);
        Ok(created.id)
    }

    async fn list(&self, folder: &str) -> StorageResult<Vec<RemoteFile>> {
        let files: Vec<RemoteFile> = self
            .query(&children_query(folder), folder)
            .await?
            .into_iter()
            .filter(|f| f.mime_type != FOLDER_MIME)
            .map(|f| RemoteFile {
                size: f.size.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0),
                path: f.id,
                name: f.name,
                modified: f.modified_time,
            })
            .collect();

        debug!("Listed {} Drive files in {}", files.len(), folder);
        Ok(files)
    }
}

/// Quote a value for a Drive `q` expression.
pub fn quote_query_value(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn folder_query(name: &str) -> String {
    format!(
        "name = {} and mimeType = '{}' and trashed = false",
        quote_query_value(name),
        FOLDER_MIME
    )
}

fn children_query(folder_id: &str) -> String {
    format!("{} in parents and trashed = false", quote_query_value(folder_id))
}

/// Body of a `multipart/related` upload: the JSON metadata part followed by
/// the media part.
fn multipart_related_body(
    boundary: &str,
    metadata: &serde_json::Value,
    media_type: &str,
    contents: &[u8],
) -> Vec<u8> {
    let mut body = Vec::with_capacity(contents.len() + 256);
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{}\r\n",
            boundary, metadata
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!("--{}\r\nContent-Type: {}\r\n\r\n", boundary, media_type).as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

fn upload_mime_type(name: &str) -> &'static str {
    DocumentFormat::from_name(name)
        .map(|format| format.mime_type())
        .unwrap_or("application/octet-stream")
}

pub fn classify_error(status: u16, body: &str, subject: &str) -> StorageError {
    match status {
        401 => StorageError::Unauthorized,
        404 => StorageError::NotFound(subject.to_string()),
        _ => StorageError::Http {
            status,
            body: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_quoting() {
        assert_eq!(quote_query_value("Docs"), "'Docs'");
        assert_eq!(quote_query_value("Bob's files"), r"'Bob\'s files'");
        assert_eq!(
            folder_query("Cloud Document Analytics"),
            "name = 'Cloud Document Analytics' and mimeType = 'application/vnd.google-apps.folder' and trashed = false"
        );
        assert_eq!(children_query("abc"), "'abc' in parents and trashed = false");
    }

    #[test]
    fn test_upload_mime_type() {
        assert_eq!(upload_mime_type("a.pdf"), "application/pdf");
        assert!(upload_mime_type("a.docx").contains("wordprocessingml"));
        assert_eq!(upload_mime_type("a.txt"), "application/octet-stream");
    }

    #[test]
    fn test_multipart_body_carries_name_and_parent() {
        let metadata = json!({ "name": "paper_1.pdf", "parents": ["folder-id"] });
        let body = multipart_related_body("b", &metadata, "application/pdf", b"%PDF-1.4");
        let text = String::from_utf8(body).unwrap();

        assert_eq!(
            text,
            "--b\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n\
             {\"name\":\"paper_1.pdf\",\"parents\":[\"folder-id\"]}\r\n\
             --b\r\nContent-Type: application/pdf\r\n\r\n%PDF-1.4\r\n--b--\r\n"
        );
    }

    #[test]
    fn test_file_list_decode() {
        let body = r#"{
            "nextPageToken": "next",
            "files": [
                {"id": "1", "name": "a.pdf", "mimeType": "application/pdf",
                 "size": "2048", "modifiedTime": "2024-03-01T10:00:00.000Z"}
            ]
        }"#;
        let list: FileList = serde_json::from_str(body).unwrap();
        assert_eq!(list.next_page_token.as_deref(), Some("next"));
        assert_eq!(list.files[0].size.as_deref(), Some("2048"));
        assert!(list.files[0].modified_time.is_some());
    }

    #[test]
    fn test_classify_error() {
        assert!(matches!(classify_error(401, "", "x"), StorageError::Unauthorized));
        assert!(classify_error(404, "", "x").is_not_found());
        assert!(matches!(
            classify_error(500, "boom", "x"),
            StorageError::Http { status: 500, .. }
        ));
    }
}
