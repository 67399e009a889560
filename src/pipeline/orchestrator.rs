// file: src/pipeline/orchestrator.rs
// description: runs user commands against the document folder, remote storage and session state
// reference: orchestrates blocking document work on the tokio runtime

use crate::classifier::{ClassificationOutcome, ClassifierPipeline, CorpusDocument, FileArtifactStore};
use crate::config::Config;
use crate::error::{AnalyticsError, Result};
use crate::fetch::{FetchOutcome, ScrapeReport, WebFetcher};
use crate::models::{DocumentFormat, SearchResult};
use crate::pipeline::progress::{BatchStats, ProgressTracker};
use crate::pipeline::state::{AppState, Operation, SessionStore};
use crate::reader::{DocumentReader, FileDocumentReader, NO_TITLE};
use crate::search::search_document;
use crate::storage::{
    DocumentStore, FolderStats, RemoteBackend, RemoteFile, RemoteStorage, StoredFile,
};
use crate::utils::{HealthCheck, HealthReport, OperationTimer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Operations reported by `stats`.
pub const REPORTED_OPERATIONS: [Operation; 4] = [
    Operation::Upload,
    Operation::Search,
    Operation::Sort,
    Operation::Classify,
];

#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub saved: Vec<PathBuf>,
    /// Already uploaded this session or not a PDF/DOCX file
    pub skipped: Vec<String>,
    pub remote_uploaded: Vec<String>,
    /// Remote storage problems; local saving carries on regardless
    pub warnings: Vec<String>,
    pub stats: BatchStats,
}

#[derive(Debug, Clone)]
pub enum FetchReport {
    Direct(FetchOutcome),
    Scraped(ScrapeReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitledDocument {
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    pub folder: FolderStats,
    /// Average seconds per operation, 0 when never run
    pub averages: Vec<(Operation, f64)>,
}

impl StatsReport {
    pub fn format(&self) -> String {
        let mut output = format!(
            "Number of Documents: {}\nTotal Size (KB): {:.2}\n\n{:<10} {:>16}\n",
            self.folder.document_count,
            self.folder.total_kb(),
            "Operation",
            "Average Time (s)"
        );
        for (operation, average) in &self.averages {
            output.push_str(&format!("{:<10} {:>16.4}\n", operation.as_str(), average));
        }
        output
    }
}

pub struct DocumentAnalytics {
    config: Config,
    store: DocumentStore,
    reader: FileDocumentReader,
    remote: Option<RemoteBackend>,
    artifacts: Arc<FileArtifactStore>,
    session: SessionStore,
    state: AppState,
    show_progress: bool,
}

impl DocumentAnalytics {
    /// Build from configuration, loading the previous session state. A remote
    /// backend that cannot be set up is logged and left disabled.
    pub async fn open(config: Config) -> Result<Self> {
        let remote = match RemoteBackend::from_config(&config.remote, config.fetch.timeout_secs) {
            Ok(remote) => remote,
            Err(e) => {
                warn!(
                    "Remote storage {:?} disabled: {}",
                    config.remote.provider, e
                );
                None
            }
        };
        let session = SessionStore::new(config.storage.session_file.clone());
        let state = session.load().await;
        Ok(Self::with_parts(config, remote, session, state))
    }

    pub fn with_parts(
        config: Config,
        remote: Option<RemoteBackend>,
        session: SessionStore,
        state: AppState,
    ) -> Self {
        Self {
            store: DocumentStore::new(config.storage.doc_folder.clone()),
            reader: FileDocumentReader::new(config.reader.title_min_chars),
            artifacts: Arc::new(FileArtifactStore::new(config.classifier.model_path.clone())),
            config,
            remote,
            session,
            state,
            show_progress: true,
        }
    }

    pub fn set_show_progress(&mut self, show: bool) {
        self.show_progress = show;
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn save_session(&self) -> Result<()> {
        self.session.save(&self.state).await
    }

    fn tracker(&self, total: usize) -> ProgressTracker {
        if self.show_progress {
            ProgressTracker::new(total)
        } else {
            ProgressTracker::hidden(total)
        }
    }

    /// Copy local PDF/DOCX files into the document folder and mirror them to
    /// the remote backend. Files already uploaded this session are skipped.
    pub async fn upload(&mut self, files: &[PathBuf]) -> Result<UploadReport> {
        let start = Instant::now();
        let mut report = UploadReport::default();
        self.store.ensure_folder()?;

        let remote_folder = match &self.remote {
            Some(remote) => match remote.create_folder(&self.config.remote.folder_name).await {
                Ok(folder) => {
                    info!("Using {} folder {}", remote.provider_name(), folder);
                    Some(folder)
                }
                Err(e) => {
                    let message = format!("{} folder creation failed: {}", remote.provider_name(), e);
                    warn!("{}", message);
                    report.warnings.push(message);
                    None
                }
            },
            None => None,
        };

        let progress = self.tracker(files.len());

        for file in files {
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            if DocumentFormat::from_name(&name).is_none() {
                warn!("Skipping unsupported file: {}", file.display());
                report.skipped.push(name);
                progress.inc_skipped();
                continue;
            }

            if self.state.is_uploaded(&name) {
                info!("{} already uploaded in this session", name);
                report.skipped.push(name);
                progress.inc_skipped();
                continue;
            }

            progress.set_message(name.clone());
            let saved = match self.store.import(file) {
                Ok(saved) => saved,
                Err(e) => {
                    warn!("Failed to save {}: {}", file.display(), e);
                    progress.inc_failed();
                    continue;
                }
            };
            let size = std::fs::metadata(&saved).map(|m| m.len()).unwrap_or(0);

            match (&self.remote, &remote_folder) {
                (Some(remote), Some(folder)) => match remote.upload(&saved, folder).await {
                    Ok(remote_path) => {
                        info!("Uploaded {} to {}", name, remote.provider_name());
                        report.remote_uploaded.push(remote_path);
                        self.state.mark_uploaded(&name);
                    }
                    Err(e) => {
                        let message =
                            format!("{} upload failed for {}: {}", remote.provider_name(), name, e);
                        warn!("{}", message);
                        report.warnings.push(message);
                    }
                },
                _ => {
                    self.state.mark_uploaded(&name);
                }
            }

            report.saved.push(saved);
            progress.inc_processed(size);
        }

        report.stats = progress.get_stats();
        progress.finish();
        self.state.record_time(Operation::Upload, start.elapsed());
        Ok(report)
    }

    /// Download one document from `url`, or with `scrape` every document
    /// linked from the page at `url`.
    pub async fn fetch(&mut self, url: &str, scrape: bool) -> Result<FetchReport> {
        let timer = OperationTimer::new("fetch");
        let report = self.run_fetch(url, scrape).await;
        self.state.record_time(Operation::Fetch, timer.finish());
        report
    }

    async fn run_fetch(&self, url: &str, scrape: bool) -> Result<FetchReport> {
        let fetcher = WebFetcher::new(&self.config.fetch)?;
        self.store.ensure_folder()?;

        if scrape {
            Ok(FetchReport::Scraped(fetcher.scrape(url, &self.store).await?))
        } else {
            Ok(FetchReport::Direct(fetcher.fetch_direct(url, &self.store).await?))
        }
    }

    /// Supported documents ordered by extracted title. A document whose
    /// title cannot be read sorts as "No Title".
    pub async fn sort_by_title(&mut self) -> Result<Vec<TitledDocument>> {
        let timer = OperationTimer::new("sort");
        let documents = self.store.documents()?;
        let reader = self.reader;

        let mut titled = tokio::task::spawn_blocking(move || {
            documents
                .into_iter()
                .map(|doc| {
                    let title = reader.title(&doc.path).unwrap_or_else(|e| {
                        warn!("Failed to read title of {}: {}", doc.name, e);
                        NO_TITLE.to_string()
                    });
                    TitledDocument {
                        name: doc.name,
                        title,
                    }
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| AnalyticsError::Task(format!("Sorting task failed: {}", e)))?;

        titled.sort_by(|a, b| a.title.cmp(&b.title));
        self.state.record_time(Operation::Sort, timer.finish_with_count(titled.len()));
        Ok(titled)
    }

    /// Documents containing `keyword`, by name, with their search results.
    pub async fn search(&mut self, keyword: &str) -> Result<Vec<(String, SearchResult)>> {
        let timer = OperationTimer::new("search");
        let documents = self.store.documents()?;
        let reader = self.reader;
        let capture = self.config.search.boundary_capture;
        let keyword = keyword.to_string();

        let results = tokio::task::spawn_blocking(move || {
            documents
                .into_iter()
                .filter_map(|doc| {
                    let result = search_document(&reader, &doc.path, &keyword, capture);
                    result.found.then_some((doc.name, result))
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| AnalyticsError::Task(format!("Search task failed: {}", e)))?;

        self.state.record_time(Operation::Search, timer.finish_with_count(results.len()));
        Ok(results)
    }

    /// Classify every supported document in the folder. A document whose text
    /// cannot be extracted takes part with empty text.
    pub async fn classify(&mut self) -> Result<ClassificationOutcome> {
        let timer = OperationTimer::new("classify");
        let documents = self.store.documents()?;
        let corpus = self.read_corpus(documents).await?;

        let pipeline = ClassifierPipeline::new(self.config.classifier.clone());
        let artifacts = Arc::clone(&self.artifacts);

        let outcome = tokio::task::spawn_blocking(move || {
            pipeline.classify_corpus(&corpus, artifacts.as_ref())
        })
        .await
        .map_err(|e| AnalyticsError::Task(format!("Classification task failed: {}", e)))??;

        self.state.record_time(Operation::Classify, timer.finish());
        Ok(outcome)
    }

    async fn read_corpus(&self, documents: Vec<StoredFile>) -> Result<Vec<CorpusDocument>> {
        let progress = Arc::new(self.tracker(documents.len()));
        let reader = self.reader;
        let task_progress = Arc::clone(&progress);

        let corpus = tokio::task::spawn_blocking(move || {
            documents
                .into_iter()
                .map(|doc| {
                    task_progress.set_message(doc.name.clone());
                    let text = match reader.read(&doc.path) {
                        Ok(extracted) => {
                            task_progress.inc_processed(doc.size);
                            extracted.full_text()
                        }
                        Err(e) => {
                            warn!("Failed to extract {}, classifying as empty: {}", doc.name, e);
                            task_progress.inc_failed();
                            String::new()
                        }
                    };
                    CorpusDocument::new(doc.name, text)
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| AnalyticsError::Task(format!("Reading task failed: {}", e)))?;

        progress.finish();
        Ok(corpus)
    }

    pub fn stats(&self) -> Result<StatsReport> {
        Ok(StatsReport {
            folder: self.store.stats()?,
            averages: REPORTED_OPERATIONS
                .iter()
                .map(|op| (*op, self.state.metrics.average(*op)))
                .collect(),
        })
    }

    pub async fn remote_files(&self) -> Result<Vec<RemoteFile>> {
        let remote = self.remote.as_ref().ok_or_else(|| {
            AnalyticsError::Config("No remote storage provider configured".to_string())
        })?;
        let folder = remote.create_folder(&self.config.remote.folder_name).await?;
        Ok(remote.list(&folder).await?)
    }

    /// Probe the document folder and the remote backend.
    pub async fn health(&self) -> HealthReport {
        let mut checks = Vec::new();

        let start = Instant::now();
        checks.push(match self.store.stats() {
            Ok(stats) if self.store.root().is_dir() => HealthCheck::healthy(
                &format!("document folder ({} files)", stats.document_count),
                start.elapsed(),
            ),
            Ok(_) => HealthCheck::degraded(
                "document folder",
                format!("{} does not exist yet", self.store.root().display()),
                start.elapsed(),
            ),
            Err(e) => HealthCheck::unhealthy("document folder", e.to_string(), start.elapsed()),
        });

        if let Some(remote) = &self.remote {
            let start = Instant::now();
            checks.push(match remote.verify().await {
                Ok(account) => HealthCheck::healthy(
                    &format!("{} ({})", remote.provider_name(), account),
                    start.elapsed(),
                ),
                Err(e) => HealthCheck::unhealthy(remote.provider_name(), e.to_string(), start.elapsed()),
            });
        }

        HealthReport::new(checks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::docx::tests::build_docx;
    use crate::utils::HealthStatus;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn analytics(dir: &TempDir) -> DocumentAnalytics {
        let mut config = Config::default_config();
        config.storage.doc_folder = dir.path().join("docs");
        config.storage.session_file = dir.path().join("session.json");
        config.classifier.model_path = dir.path().join("model.json");

        let session = SessionStore::new(config.storage.session_file.clone());
        let mut analytics = DocumentAnalytics::with_parts(config, None, session, AppState::default());
        analytics.set_show_progress(false);
        analytics
    }

    fn write_docx(dir: &TempDir, name: &str, paragraphs: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, build_docx(paragraphs)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_saves_and_skips_repeats() {
        let dir = tempdir().unwrap();
        let mut app = analytics(&dir);
        let doc = write_docx(&dir, "report.docx", &["Quarterly results overview"]);
        let text = dir.path().join("notes.txt");
        fs::write(&text, "plain").unwrap();

        let report = app.upload(&[doc.clone(), text]).await.unwrap();
        assert_eq!(report.saved.len(), 1);
        assert_eq!(report.skipped, vec!["notes.txt".to_string()]);
        assert!(app.state().is_uploaded("report.docx"));
        assert!(app.store().contains("report.docx"));

        let again = app.upload(&[doc]).await.unwrap();
        assert!(again.saved.is_empty());
        assert_eq!(again.skipped, vec!["report.docx".to_string()]);
        assert_eq!(app.state().metrics.samples(Operation::Upload).len(), 2);
    }

    #[tokio::test]
    async fn test_sort_by_title() {
        let dir = tempdir().unwrap();
        let mut app = analytics(&dir);
        let b = write_docx(&dir, "b.docx", &["Zebra migration patterns"]);
        let a = write_docx(&dir, "a.docx", &["Aardvark feeding habits"]);
        let c = write_docx(&dir, "c.docx", &["short"]);
        app.upload(&[a, b, c]).await.unwrap();

        let sorted = app.sort_by_title().await.unwrap();
        let titles: Vec<&str> = sorted.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Aardvark feeding habits", NO_TITLE, "Zebra migration patterns"]
        );
    }

    #[tokio::test]
    async fn test_search_returns_matching_documents() {
        let dir = tempdir().unwrap();
        let mut app = analytics(&dir);
        let pets = write_docx(&dir, "pets.docx", &["The cat sat.", "No dogs here."]);
        let other = write_docx(&dir, "other.docx", &["Concatenate strings."]);
        app.upload(&[pets, other]).await.unwrap();

        let results = app.search("cat").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "pets.docx");
        assert_eq!(results[0].1.match_count(), 1);
        assert_eq!(app.state().metrics.samples(Operation::Search).len(), 1);
    }

    #[tokio::test]
    async fn test_classify_includes_unreadable_documents() {
        let dir = tempdir().unwrap();
        let mut app = analytics(&dir);
        app.store().save_overwrite("broken.pdf", b"not a pdf").unwrap();
        app.store().save_overwrite("ignored.txt", b"research study").unwrap();

        let outcome = app.classify().await.unwrap();
        let records = outcome.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "broken.pdf");
        assert!(matches!(
            outcome,
            ClassificationOutcome::InsufficientDiversity { .. }
        ));
    }

    #[tokio::test]
    async fn test_classify_empty_folder() {
        let dir = tempdir().unwrap();
        let mut app = analytics(&dir);
        let outcome = app.classify().await.unwrap();
        assert_eq!(outcome, ClassificationOutcome::NothingToClassify);
        assert_eq!(app.state().metrics.samples(Operation::Classify).len(), 1);
    }

    #[tokio::test]
    async fn test_stats_and_session_persistence() {
        let dir = tempdir().unwrap();
        let mut app = analytics(&dir);
        app.store().save_overwrite("a.pdf", &[0u8; 2048]).unwrap();
        app.search("anything").await.unwrap();

        let stats = app.stats().unwrap();
        assert_eq!(stats.folder.document_count, 1);
        assert_eq!(stats.folder.total_kb(), 2.0);
        assert_eq!(stats.averages.len(), 4);
        assert_eq!(stats.averages[0], (Operation::Upload, 0.0));
        assert!(stats.format().contains("Total Size (KB): 2.00"));

        app.save_session().await.unwrap();
        let restored = SessionStore::new(dir.path().join("session.json")).load().await;
        assert_eq!(restored.metrics.samples(Operation::Search).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_still_records_time() {
        let dir = tempdir().unwrap();
        let mut app = analytics(&dir);

        assert!(matches!(
            app.fetch("not a url", false).await,
            Err(AnalyticsError::Fetch(_))
        ));
        assert!(app.fetch("also not a url", true).await.is_err());
        assert_eq!(app.state().metrics.samples(Operation::Fetch).len(), 2);
    }

    #[tokio::test]
    async fn test_open_disables_remote_with_blank_token() {
        let dir = tempdir().unwrap();
        let mut config = Config::default_config();
        config.storage.doc_folder = dir.path().join("docs");
        config.storage.session_file = dir.path().join("session.json");
        config.remote.provider = crate::config::RemoteProvider::Dropbox;
        config.remote.dropbox_token = Some("   ".to_string());

        let app = DocumentAnalytics::open(config).await.unwrap();
        assert!(matches!(
            app.remote_files().await,
            Err(AnalyticsError::Config(_))
        ));
        assert_eq!(app.health().await.checks.len(), 1);
    }

    #[tokio::test]
    async fn test_remote_files_requires_provider() {
        let dir = tempdir().unwrap();
        let app = analytics(&dir);
        assert!(matches!(
            app.remote_files().await,
            Err(AnalyticsError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_health_without_folder_is_degraded() {
        let dir = tempdir().unwrap();
        let app = analytics(&dir);
        let report = app.health().await;
        assert_eq!(report.overall_status, HealthStatus::Degraded);
    }
}
