// file: src/pipeline/mod.rs
// description: command orchestration, progress and session state exports
// reference: pipeline orchestration

mod orchestrator;
mod progress;
mod state;

pub use orchestrator::{
    DocumentAnalytics, FetchReport, REPORTED_OPERATIONS, StatsReport, TitledDocument,
    UploadReport,
};
pub use progress::{BatchStats, ProgressTracker};
pub use state::{AppState, Operation, OperationMetrics, SessionStore};
