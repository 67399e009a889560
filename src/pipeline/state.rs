// file: src/pipeline/state.rs
// description: session state carried between commands
// reference: json-backed persistence of per-session history

use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Upload,
    Fetch,
    Search,
    Sort,
    Classify,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Upload,
        Operation::Fetch,
        Operation::Search,
        Operation::Sort,
        Operation::Classify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Fetch => "fetch",
            Self::Search => "search",
            Self::Sort => "sort",
            Self::Classify => "classify",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elapsed-time samples in seconds, per operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationMetrics {
    samples: BTreeMap<Operation, Vec<f64>>,
}

impl OperationMetrics {
    pub fn record(&mut self, operation: Operation, elapsed: Duration) {
        self.samples
            .entry(operation)
            .or_default()
            .push(elapsed.as_secs_f64());
    }

    pub fn samples(&self, operation: Operation) -> &[f64] {
        self.samples.get(&operation).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mean of the recorded samples, 0 when there are none.
    pub fn average(&self, operation: Operation) -> f64 {
        let samples = self.samples(operation);
        if samples.is_empty() {
            0.0
        } else {
            samples.iter().sum::<f64>() / samples.len() as f64
        }
    }
}

/// Application state owned by the command layer. The core components never
/// touch it; commands mutate it only through `record_time` and
/// `mark_uploaded`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub metrics: OperationMetrics,
    #[serde(default)]
    pub uploaded: BTreeSet<String>,
}

impl AppState {
    pub fn record_time(&mut self, operation: Operation, elapsed: Duration) {
        debug!("{} took {:.2}s", operation, elapsed.as_secs_f64());
        self.metrics.record(operation, elapsed);
    }

    /// Returns false when the name was already recorded.
    pub fn mark_uploaded(&mut self, name: &str) -> bool {
        self.uploaded.insert(name.to_string())
    }

    pub fn is_uploaded(&self, name: &str) -> bool {
        self.uploaded.contains(name)
    }
}

/// Loads and saves `AppState` as JSON between invocations.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The saved state, or a fresh one when the file is missing or unreadable.
    pub async fn load(&self) -> AppState {
        if !self.path.exists() {
            debug!("No session file at {}", self.path.display());
            return AppState::default();
        }

        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read session file, starting fresh: {}", e);
                return AppState::default();
            }
        };

        match serde_json::from_str::<AppState>(&contents) {
            Ok(state) => {
                info!("Loaded session with {} uploaded documents", state.uploaded.len());
                state
            }
            Err(e) => {
                warn!("Failed to parse session file, starting fresh: {}", e);
                AppState::default()
            }
        }
    }

    pub async fn save(&self, state: &AppState) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| AnalyticsError::FileOperation {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let contents = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, contents)
            .await
            .map_err(|source| AnalyticsError::FileOperation {
                path: self.path.clone(),
                source,
            })?;

        debug!("Saved session to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_average_defaults_to_zero() {
        let metrics = OperationMetrics::default();
        assert_eq!(metrics.average(Operation::Classify), 0.0);
        assert!(metrics.samples(Operation::Classify).is_empty());
    }

    #[test]
    fn test_record_time_and_average() {
        let mut state = AppState::default();
        state.record_time(Operation::Search, Duration::from_millis(500));
        state.record_time(Operation::Search, Duration::from_millis(1500));

        assert_eq!(state.metrics.samples(Operation::Search).len(), 2);
        assert!((state.metrics.average(Operation::Search) - 1.0).abs() < 1e-9);
        assert_eq!(state.metrics.average(Operation::Upload), 0.0);
    }

    #[test]
    fn test_mark_uploaded_once() {
        let mut state = AppState::default();
        assert!(state.mark_uploaded("a.pdf"));
        assert!(!state.mark_uploaded("a.pdf"));
        assert!(state.is_uploaded("a.pdf"));
        assert!(!state.is_uploaded("b.pdf"));
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("state/session.json"));

        let mut state = AppState::default();
        state.mark_uploaded("report.docx");
        state.record_time(Operation::Upload, Duration::from_secs(2));
        store.save(&state).await.unwrap();

        let loaded = store.load().await;
        assert!(loaded.is_uploaded("report.docx"));
        assert_eq!(loaded.metrics.average(Operation::Upload), 2.0);
    }

    #[tokio::test]
    async fn test_corrupt_session_starts_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let state = SessionStore::new(path).load().await;
        assert_eq!(state, AppState::default());
    }
}
