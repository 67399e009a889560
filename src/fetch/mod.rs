// file: src/fetch/mod.rs
// description: downloading documents by URL and scraping pages for document links
// reference: https://docs.rs/reqwest

use crate::config::FetchConfig;
use crate::error::{AnalyticsError, Result};
use crate::models::DocumentFormat;
use crate::storage::DocumentStore;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, Url};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

lazy_static! {
    static ref HREF: Regex = Regex::new(
        r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#
    )
    .expect("HREF regex is valid");
}

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Saved { url: String, path: PathBuf },
    /// Neither the content type nor the file name indicates PDF or DOCX
    Unsupported {
        url: String,
        content_type: String,
        file_name: String,
    },
    Failed { url: String, reason: String },
}

impl FetchOutcome {
    pub fn saved_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Saved { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScrapeReport {
    pub links: Vec<String>,
    pub outcomes: Vec<FetchOutcome>,
}

impl ScrapeReport {
    pub fn saved_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.saved_path().is_some()).count()
    }
}

pub struct WebFetcher {
    client: Client,
    link_extensions: Vec<String>,
}

impl WebFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AnalyticsError::Fetch(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            link_extensions: config.link_extensions.iter().map(|e| e.to_lowercase()).collect(),
        })
    }

    /// Download a single document. The name comes from the URL path and is
    /// made unique within the store.
    pub async fn fetch_direct(&self, url: &str, store: &DocumentStore) -> Result<FetchOutcome> {
        let parsed = Url::parse(url).map_err(|e| AnalyticsError::Fetch(format!("{}: {}", url, e)))?;

        let response = match self.client.get(parsed.clone()).send().await {
            Ok(response) => response,
            Err(e) => return Ok(failed(url, e)),
        };
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => return Ok(failed(url, e)),
        };

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let file_name = url_file_name(&parsed);

        let Some(format) = detect_format(&content_type, &file_name) else {
            warn!(
                "Unsupported file type from {} (Content-Type: {}, file name: {})",
                url, content_type, file_name
            );
            return Ok(FetchOutcome::Unsupported {
                url: url.to_string(),
                content_type,
                file_name,
            });
        };

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return Ok(failed(url, e)),
        };

        let name = with_extension(&file_name, format);
        let path = store.save_unique(&name, &bytes)?;
        info!("Fetched {} from {}", path.display(), url);

        Ok(FetchOutcome::Saved {
            url: url.to_string(),
            path,
        })
    }

    /// Collect document links from a web page and download each one. A link
    /// that fails to download is reported in the outcomes; only failing to
    /// load the page itself is an error.
    pub async fn scrape(&self, page_url: &str, store: &DocumentStore) -> Result<ScrapeReport> {
        let base =
            Url::parse(page_url).map_err(|e| AnalyticsError::Fetch(format!("{}: {}", page_url, e)))?;

        let html = self
            .client
            .get(base.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AnalyticsError::Fetch(format!("Error scraping {}: {}", page_url, e)))?
            .text()
            .await
            .map_err(|e| AnalyticsError::Fetch(format!("Error reading {}: {}", page_url, e)))?;

        let links: Vec<String> = document_links(&html, &self.link_extensions)
            .into_iter()
            .filter_map(|link| resolve_link(&base, &link))
            .map(|url| url.to_string())
            .collect();

        if links.is_empty() {
            warn!("No document links found on {}", page_url);
            return Ok(ScrapeReport::default());
        }
        info!("Found {} document links on {}", links.len(), page_url);

        let headers = browser_headers(page_url);
        let mut outcomes = Vec::with_capacity(links.len());

        for (index, link) in links.iter().enumerate() {
            let outcome = match self.download(link, headers.clone()).await {
                Ok(bytes) => {
                    let name = link_file_name(link, index + 1);
                    let path = store.save_overwrite(&name, &bytes)?;
                    info!("Downloaded {}", name);
                    FetchOutcome::Saved {
                        url: link.clone(),
                        path,
                    }
                }
                Err(e) => {
                    warn!("Failed to download {}: {}", link, e);
                    failed(link, e)
                }
            };
            outcomes.push(outcome);
        }

        Ok(ScrapeReport { links, outcomes })
    }

    async fn download(&self, link: &str, headers: HeaderMap) -> reqwest::Result<Vec<u8>> {
        debug!("Downloading {}", link);
        let response = self
            .client
            .get(link)
            .headers(headers)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

fn failed(url: &str, reason: impl ToString) -> FetchOutcome {
    FetchOutcome::Failed {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

fn browser_headers(referer: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    if let Ok(value) = HeaderValue::from_str(referer) {
        headers.insert(REFERER, value);
    }
    headers
}

/// PDF when the content type mentions `pdf` or the name ends in `.pdf`,
/// DOCX for a `wordprocessingml.document` content type or `.docx` name.
pub fn detect_format(content_type: &str, file_name: &str) -> Option<DocumentFormat> {
    let content_type = content_type.to_lowercase();
    let file_name = file_name.to_lowercase();

    if content_type.contains("pdf") || file_name.ends_with(".pdf") {
        Some(DocumentFormat::Pdf)
    } else if content_type.contains("wordprocessingml.document") || file_name.ends_with(".docx") {
        Some(DocumentFormat::Docx)
    } else {
        None
    }
}

/// Last non-empty path segment of the URL, percent-decoding left as is.
pub fn url_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .unwrap_or_default()
        .to_string()
}

fn with_extension(file_name: &str, format: DocumentFormat) -> String {
    if file_name.is_empty() {
        format!("document{}", format.extension())
    } else if DocumentFormat::from_name(file_name) == Some(format) {
        file_name.to_string()
    } else {
        format!("{}{}", file_name, format.extension())
    }
}

fn link_file_name(link: &str, ordinal: usize) -> String {
    let name = Url::parse(link)
        .map(|url| url_file_name(&url))
        .unwrap_or_default();
    if name.is_empty() {
        format!("document_{}.pdf", ordinal)
    } else {
        name
    }
}

/// `href` values of anchor tags, in document order.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    HREF.captures_iter(html)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim().replace("&amp;", "&"))
        .collect()
}

/// Links worth downloading: those ending in one of `extensions`
/// (case-insensitive), and arXiv abstract pages rewritten to their PDF.
pub fn document_links(html: &str, extensions: &[String]) -> Vec<String> {
    extract_hrefs(html)
        .into_iter()
        .filter_map(|href| {
            let lowered = href.to_lowercase();
            if extensions.iter().any(|ext| lowered.ends_with(ext.as_str())) {
                Some(href)
            } else if href.contains("arxiv.org/abs/") {
                arxiv_pdf_link(&href)
            } else {
                None
            }
        })
        .collect()
}

/// `.../arxiv.org/abs/<id>` becomes `https://arxiv.org/pdf/<id>.pdf`.
pub fn arxiv_pdf_link(href: &str) -> Option<String> {
    let paper_id = href.trim_end_matches('/').rsplit('/').next()?;
    if paper_id.is_empty() {
        return None;
    }
    Some(format!("https://arxiv.org/pdf/{}.pdf", paper_id))
}

/// Absolute links pass through; relative ones resolve against the page.
pub fn resolve_link(base: &Url, link: &str) -> Option<Url> {
    if link.starts_with("http://") || link.starts_with("https://") {
        Url::parse(link).ok()
    } else {
        base.join(link).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use pretty_assertions::assert_eq;

    fn extensions() -> Vec<String> {
        Config::default_config().fetch.link_extensions
    }

    #[test]
    fn test_extract_hrefs_quoting() {
        let html = r#"
            <a href="one.pdf">One</a>
            <A class="x" HREF='two.docx'>Two</A>
            <a href=three.txt>Three</a>
            <a name="anchor">none</a>
            <a href="page?a=1&amp;b=2">q</a>
        "#;
        assert_eq!(
            extract_hrefs(html),
            vec!["one.pdf", "two.docx", "three.txt", "page?a=1&b=2"]
        );
    }

    #[test]
    fn test_document_links_filter_and_rewrite() {
        let html = r#"
            <a href="/papers/A.PDF">a</a>
            <a href="index.html">skip</a>
            <a href="https://arxiv.org/abs/2301.00001">arxiv</a>
            <a href="notes.rtf">rtf</a>
        "#;
        assert_eq!(
            document_links(html, &extensions()),
            vec![
                "/papers/A.PDF",
                "https://arxiv.org/pdf/2301.00001.pdf",
                "notes.rtf",
            ]
        );
    }

    #[test]
    fn test_resolve_link() {
        let base = Url::parse("https://example.com/docs/index.html").unwrap();
        assert_eq!(
            resolve_link(&base, "a.pdf").unwrap().as_str(),
            "https://example.com/docs/a.pdf"
        );
        assert_eq!(
            resolve_link(&base, "/root.pdf").unwrap().as_str(),
            "https://example.com/root.pdf"
        );
        assert_eq!(
            resolve_link(&base, "https://other.org/b.pdf").unwrap().as_str(),
            "https://other.org/b.pdf"
        );
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(detect_format("application/pdf", "download"), Some(DocumentFormat::Pdf));
        assert_eq!(detect_format("", "Report.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(
            detect_format(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "file"
            ),
            Some(DocumentFormat::Docx)
        );
        assert_eq!(detect_format("text/html; charset=utf-8", "index.html"), None);
    }

    #[test]
    fn test_file_names() {
        let url = Url::parse("https://example.com/files/paper.pdf?dl=1").unwrap();
        assert_eq!(url_file_name(&url), "paper.pdf");
        assert_eq!(url_file_name(&Url::parse("https://example.com/").unwrap()), "");

        assert_eq!(with_extension("paper.pdf", DocumentFormat::Pdf), "paper.pdf");
        assert_eq!(with_extension("download", DocumentFormat::Docx), "download.docx");
        assert_eq!(with_extension("", DocumentFormat::Pdf), "document.pdf");

        assert_eq!(link_file_name("https://example.com/", 3), "document_3.pdf");
        assert_eq!(link_file_name("https://example.com/x/a.docx", 1), "a.docx");
    }

    #[test]
    fn test_browser_headers_include_referer() {
        let headers = browser_headers("https://example.com/page");
        assert_eq!(headers.get(REFERER).unwrap(), "https://example.com/page");
        assert!(headers.contains_key(ACCEPT_LANGUAGE));
    }
}
