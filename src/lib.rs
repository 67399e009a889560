// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod classifier;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod search;
pub mod storage;
pub mod utils;

pub use classifier::{
    ArtifactSink, ClassificationOutcome, ClassificationReport, ClassifierPipeline,
    CorpusDocument, FileArtifactStore, KeywordLabeler, ModelArtifact, heuristic_label,
};
pub use config::{BoundaryCapture, CategoryRule, Config, RemoteProvider};
pub use error::{AnalyticsError, Result};
pub use fetch::{FetchOutcome, ScrapeReport, WebFetcher};
pub use models::{
    CategoryLabel, ClassificationRecord, DocumentFormat, ExtractedDocument, Match, MatchLocation,
    SearchResult,
};
pub use pipeline::{
    AppState, DocumentAnalytics, FetchReport, Operation, OperationMetrics, SessionStore,
    StatsReport,
};
pub use reader::{DocumentReader, FileDocumentReader};
pub use search::{Highlighter, find_matches, highlight_text, render_html_report, search_document};
pub use storage::{
    DocumentStore, RemoteBackend, RemoteFile, RemoteStorage, StorageError, unique_name,
};
pub use utils::{HealthCheck, HealthReport, HealthStatus, OperationTimer, Validator};
