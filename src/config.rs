// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{AnalyticsError, Result};
use crate::models::CategoryLabel;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    pub reader: ReaderConfig,
    pub search: SearchConfig,
    pub classifier: ClassifierConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub doc_folder: PathBuf,
    pub session_file: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteProvider {
    #[default]
    None,
    Dropbox,
    GoogleDrive,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub provider: RemoteProvider,
    #[serde(default = "default_remote_folder")]
    pub folder_name: String,
    #[serde(default)]
    pub dropbox_token: Option<String>,
    #[serde(default)]
    pub drive_token: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            provider: RemoteProvider::None,
            folder_name: default_remote_folder(),
            dropbox_token: None,
            drive_token: None,
        }
    }
}

fn default_remote_folder() -> String {
    "Cloud Document Analytics".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReaderConfig {
    /// A title line must be strictly longer than this many characters.
    pub title_min_chars: usize,
}

/// Whether the non-word characters flanking a keyword are part of a
/// reported match span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryCapture {
    /// Report only the keyword itself.
    #[default]
    Exclude,
    /// Report the whole pattern match, flanking characters included.
    Consume,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub highlight_color: String,
    #[serde(default)]
    pub boundary_capture: BoundaryCapture,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClassifierConfig {
    pub max_features: usize,
    pub test_size: f64,
    pub random_seed: u64,
    pub smoothing: f64,
    pub model_path: PathBuf,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRule>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CategoryRule {
    pub category: CategoryLabel,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: CategoryLabel, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }
}

pub fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            CategoryLabel::Science,
            &["research", "experiment", "study", "scientific", "analysis"],
        ),
        CategoryRule::new(
            CategoryLabel::Technology,
            &["software", "hardware", "computer", "digital", "system"],
        ),
        CategoryRule::new(
            CategoryLabel::Business,
            &["market", "finance", "company", "business", "management"],
        ),
        CategoryRule::new(
            CategoryLabel::Education,
            &["learning", "teaching", "education", "student", "course"],
        ),
        CategoryRule::new(
            CategoryLabel::Health,
            &["medical", "health", "treatment", "patient", "disease"],
        ),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub link_extensions: Vec<String>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DOC_ANALYTICS")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| AnalyticsError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| AnalyticsError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                doc_folder: PathBuf::from("sample_documents"),
                session_file: PathBuf::from(".doc_analytics/session.json"),
            },
            remote: RemoteConfig::default(),
            reader: ReaderConfig {
                title_min_chars: 10,
            },
            search: SearchConfig {
                highlight_color: "#ADD8E6".to_string(),
                boundary_capture: BoundaryCapture::Exclude,
            },
            classifier: ClassifierConfig {
                max_features: 1000,
                test_size: 0.2,
                random_seed: 42,
                smoothing: 1.0,
                model_path: PathBuf::from("classifier_model.json"),
                categories: default_categories(),
            },
            fetch: FetchConfig {
                timeout_secs: 30,
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
                link_extensions: vec![
                    ".pdf".to_string(),
                    ".docx".to_string(),
                    ".doc".to_string(),
                    ".txt".to_string(),
                    ".rtf".to_string(),
                ],
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.classifier.max_features == 0 {
            return Err(AnalyticsError::Config(
                "max_features must be greater than 0".to_string(),
            ));
        }

        if !(self.classifier.test_size > 0.0 && self.classifier.test_size < 1.0) {
            return Err(AnalyticsError::Config(
                "test_size must be between 0 and 1 (exclusive)".to_string(),
            ));
        }

        if self.classifier.smoothing <= 0.0 {
            return Err(AnalyticsError::Config(
                "smoothing must be greater than 0".to_string(),
            ));
        }

        if self
            .classifier
            .categories
            .iter()
            .any(|rule| rule.category == CategoryLabel::Other)
        {
            return Err(AnalyticsError::Config(
                "Other is the fallback label and cannot own keywords".to_string(),
            ));
        }

        let mut seen = Vec::with_capacity(self.classifier.categories.len());
        for rule in &self.classifier.categories {
            if seen.contains(&rule.category) {
                return Err(AnalyticsError::Config(format!(
                    "category {} is declared more than once",
                    rule.category
                )));
            }
            seen.push(rule.category);
        }

        Ok(())
    }
}
