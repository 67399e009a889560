// file: src/classifier/mod.rs
// description: document categorisation module exports
// reference: heuristic labelling followed by a tf-idf naive bayes model

pub mod artifact;
pub mod heuristic;
pub mod metrics;
pub mod naive_bayes;
pub mod pipeline;
pub mod split;
pub mod vectorizer;

pub use artifact::{ArtifactSink, FileArtifactStore, ModelArtifact};
pub use heuristic::{KeywordLabeler, heuristic_label};
pub use metrics::ClassificationReport;
pub use naive_bayes::MultinomialNb;
pub use pipeline::{
    ClassificationOutcome, ClassifierPipeline, CorpusDocument, TrainedClassification,
};
pub use split::{Split, stratified_split};
pub use vectorizer::TfidfVectorizer;
