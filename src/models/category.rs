// file: src/models/category.rs
// description: topical category labels and per-document classification records

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of topical categories. Declaration order is significant: it is
/// the tie-break order for heuristic labels and the class order of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryLabel {
    Science,
    Technology,
    Business,
    Education,
    Health,
    Other,
}

impl CategoryLabel {
    pub const ALL: [CategoryLabel; 6] = [
        Self::Science,
        Self::Technology,
        Self::Business,
        Self::Education,
        Self::Health,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Science => "Science",
            Self::Technology => "Technology",
            Self::Business => "Business",
            Self::Education => "Education",
            Self::Health => "Health",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub name: String,
    pub heuristic_label: CategoryLabel,
    /// Present only when a model was trained in this run
    pub model_label: Option<CategoryLabel>,
}

impl ClassificationRecord {
    /// The label to display: the model's prediction when available.
    pub fn effective_label(&self) -> CategoryLabel {
        self.model_label.unwrap_or(self.heuristic_label)
    }
}
