// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod category;
pub mod document;
pub mod search_result;

pub use category::{CategoryLabel, ClassificationRecord};
pub use document::{DocumentFormat, ExtractedDocument};
pub use search_result::{Match, MatchLocation, SearchResult};
