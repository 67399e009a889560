// file: src/classifier/pipeline.rs
// description: corpus classification from heuristic labels to a trained model
// reference: orchestrates labelling, vectorizing, splitting, training and reporting

use super::artifact::{ArtifactSink, ModelArtifact};
use super::heuristic::KeywordLabeler;
use super::metrics::ClassificationReport;
use super::naive_bayes::MultinomialNb;
use super::split::{can_stratify, class_counts, stratified_split};
use super::vectorizer::TfidfVectorizer;
use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::models::{CategoryLabel, ClassificationRecord};
use crate::utils::OperationTimer;
use std::collections::BTreeMap;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    pub name: String,
    pub text: String,
}

impl CorpusDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainedClassification {
    pub records: Vec<ClassificationRecord>,
    /// Absent when the held-out split is empty
    pub report: Option<ClassificationReport>,
    /// Every document shares one heuristic label
    pub single_class: bool,
    pub train_size: usize,
    pub test_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    /// The corpus was empty
    NothingToClassify,
    /// Some heuristic class has fewer than two members; only heuristic
    /// labels are available
    InsufficientDiversity {
        records: Vec<ClassificationRecord>,
        class_counts: BTreeMap<CategoryLabel, usize>,
    },
    Trained(TrainedClassification),
}

impl ClassificationOutcome {
    pub fn records(&self) -> &[ClassificationRecord] {
        match self {
            Self::NothingToClassify => &[],
            Self::InsufficientDiversity { records, .. } => records,
            Self::Trained(trained) => &trained.records,
        }
    }
}

pub struct ClassifierPipeline {
    config: ClassifierConfig,
    labeler: KeywordLabeler,
}

impl ClassifierPipeline {
    pub fn new(config: ClassifierConfig) -> Self {
        let labeler = KeywordLabeler::new(config.categories.clone());
        Self { config, labeler }
    }

    /// Label, vectorize and, when every heuristic class has at least two
    /// members, train and evaluate a model. Each call starts from scratch.
    /// Only a failure to persist the trained model is an error.
    pub fn classify_corpus(
        &self,
        documents: &[CorpusDocument],
        sink: &dyn ArtifactSink,
    ) -> Result<ClassificationOutcome> {
        if documents.is_empty() {
            info!("No documents available for classification");
            return Ok(ClassificationOutcome::NothingToClassify);
        }

        let timer = OperationTimer::new("classification");

        let labels: Vec<CategoryLabel> = documents
            .iter()
            .map(|doc| self.labeler.label(&doc.text))
            .collect();

        let texts: Vec<&str> = documents.iter().map(|doc| doc.text.as_str()).collect();
        let (vectorizer, rows) = TfidfVectorizer::fit_transform(&texts, self.config.max_features);
        timer.checkpoint(&format!("{} features", vectorizer.feature_count()));

        let counts = class_counts(&labels);
        if !can_stratify(&labels) {
            warn!(
                "Not enough documents in one or more categories to train the classifier: {:?}",
                counts
            );
            let records = documents
                .iter()
                .zip(&labels)
                .map(|(doc, label)| ClassificationRecord {
                    name: doc.name.clone(),
                    heuristic_label: *label,
                    model_label: None,
                })
                .collect();
            timer.finish_with_count(documents.len());
            return Ok(ClassificationOutcome::InsufficientDiversity {
                records,
                class_counts: counts,
            });
        }

        let single_class = counts.len() == 1;
        if single_class {
            warn!("All documents share one category; training a single-class model");
        }

        let split = stratified_split(&labels, self.config.test_size, self.config.random_seed);
        let train_rows: Vec<Vec<f64>> = split.train.iter().map(|&i| rows[i].clone()).collect();
        let train_labels: Vec<CategoryLabel> = split.train.iter().map(|&i| labels[i]).collect();

        let model = MultinomialNb::fit(
            &train_rows,
            &train_labels,
            &self.labeler.class_order(),
            self.config.smoothing,
        )?;

        let predictions: Vec<CategoryLabel> = rows.iter().map(|row| model.predict(row)).collect();

        let report = if split.test.is_empty() {
            info!("Not enough diverse documents for classification metrics after splitting");
            None
        } else {
            let truth: Vec<CategoryLabel> = split.test.iter().map(|&i| labels[i]).collect();
            let predicted: Vec<CategoryLabel> =
                split.test.iter().map(|&i| predictions[i]).collect();
            Some(ClassificationReport::new(&truth, &predicted))
        };

        let records = documents
            .iter()
            .zip(labels.iter().zip(&predictions))
            .map(|(doc, (heuristic, predicted))| ClassificationRecord {
                name: doc.name.clone(),
                heuristic_label: *heuristic,
                model_label: Some(*predicted),
            })
            .collect();

        sink.persist(&ModelArtifact::new(&texts, vectorizer, model))?;
        timer.finish_with_count(documents.len());

        Ok(ClassificationOutcome::Trained(TrainedClassification {
            records,
            report,
            single_class,
            train_size: split.train.len(),
            test_size: split.test.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::artifact::FileArtifactStore;
    use crate::config::Config;
    use crate::error::AnalyticsError;
    use std::cell::Cell;
    use tempfile::tempdir;

    struct CountingSink(Cell<usize>);

    impl ArtifactSink for CountingSink {
        fn persist(&self, _artifact: &ModelArtifact) -> Result<()> {
            self.0.set(self.0.get() + 1);
            Ok(())
        }
    }

    struct FailingSink;

    impl ArtifactSink for FailingSink {
        fn persist(&self, _artifact: &ModelArtifact) -> Result<()> {
            Err(AnalyticsError::Artifact("disk full".to_string()))
        }
    }

    fn pipeline() -> ClassifierPipeline {
        ClassifierPipeline::new(Config::default_config().classifier)
    }

    fn diverse_corpus() -> Vec<CorpusDocument> {
        vec![
            CorpusDocument::new("h1.pdf", "The patient needed medical treatment."),
            CorpusDocument::new("h2.pdf", "Disease treatment for every patient."),
            CorpusDocument::new("h3.docx", "Health of the patient improved."),
            CorpusDocument::new("t1.pdf", "Computer software and digital hardware."),
            CorpusDocument::new("t2.docx", "A software system for the computer."),
            CorpusDocument::new("t3.pdf", "Digital system hardware upgrade."),
        ]
    }

    #[test]
    fn test_empty_corpus() {
        let sink = CountingSink(Cell::new(0));
        let outcome = pipeline().classify_corpus(&[], &sink).unwrap();
        assert_eq!(outcome, ClassificationOutcome::NothingToClassify);
        assert!(outcome.records().is_empty());
        assert_eq!(sink.0.get(), 0);
    }

    #[test]
    fn test_single_document_is_insufficient() {
        let sink = CountingSink(Cell::new(0));
        let docs = vec![CorpusDocument::new("only.pdf", "A research study.")];

        let outcome = pipeline().classify_corpus(&docs, &sink).unwrap();
        match outcome {
            ClassificationOutcome::InsufficientDiversity { records, class_counts } => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].heuristic_label, CategoryLabel::Science);
                assert_eq!(records[0].model_label, None);
                assert_eq!(class_counts.get(&CategoryLabel::Science), Some(&1));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(sink.0.get(), 0);
    }

    #[test]
    fn test_one_small_class_blocks_training() {
        let mut docs = diverse_corpus();
        docs.push(CorpusDocument::new("b1.pdf", "Company finance report."));

        let outcome = pipeline()
            .classify_corpus(&docs, &CountingSink(Cell::new(0)))
            .unwrap();
        assert!(matches!(
            outcome,
            ClassificationOutcome::InsufficientDiversity { .. }
        ));
        assert!(outcome.records().iter().all(|r| r.model_label.is_none()));
    }

    #[test]
    fn test_all_other_trains_single_class() {
        let docs = vec![
            CorpusDocument::new("a.pdf", "Nothing relevant."),
            CorpusDocument::new("b.pdf", "Still nothing."),
            CorpusDocument::new("c.pdf", "Plain words only."),
        ];
        let sink = CountingSink(Cell::new(0));

        let outcome = pipeline().classify_corpus(&docs, &sink).unwrap();
        let ClassificationOutcome::Trained(trained) = outcome else {
            panic!("expected training");
        };

        assert!(trained.single_class);
        assert_eq!(trained.train_size, 2);
        assert_eq!(trained.test_size, 1);
        assert!(trained.records.iter().all(|r| {
            r.heuristic_label == CategoryLabel::Other && r.model_label == Some(CategoryLabel::Other)
        }));
        assert_eq!(sink.0.get(), 1);
    }

    #[test]
    fn test_diverse_corpus_trains_and_reports() {
        let sink = CountingSink(Cell::new(0));
        let outcome = pipeline().classify_corpus(&diverse_corpus(), &sink).unwrap();

        let ClassificationOutcome::Trained(trained) = outcome else {
            panic!("expected training");
        };
        assert!(!trained.single_class);
        assert_eq!(trained.records.len(), 6);
        assert!(trained.records.iter().all(|r| r.model_label.is_some()));
        assert_eq!(trained.test_size, 2);

        let report = trained.report.expect("test split is not empty");
        assert_eq!(report.total_support, 2);
        assert!(report.classes.iter().all(|c| {
            c.label == CategoryLabel::Health || c.label == CategoryLabel::Technology
        }));
        assert_eq!(sink.0.get(), 1);
    }

    #[test]
    fn test_model_is_persisted_to_file() {
        let dir = tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path().join("classifier_model.json"));

        pipeline().classify_corpus(&diverse_corpus(), &store).unwrap();

        let artifact = store.load().unwrap();
        assert_eq!(
            artifact.model.classes(),
            &[CategoryLabel::Technology, CategoryLabel::Health]
        );
    }

    #[test]
    fn test_model_classes_follow_configured_order() {
        let dir = tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path().join("classifier_model.json"));

        let mut config = Config::default_config().classifier;
        config.categories.reverse();
        ClassifierPipeline::new(config)
            .classify_corpus(&diverse_corpus(), &store)
            .unwrap();

        let artifact = store.load().unwrap();
        assert_eq!(
            artifact.model.classes(),
            &[CategoryLabel::Health, CategoryLabel::Technology]
        );
    }

    #[test]
    fn test_persist_failure_propagates() {
        let result = pipeline().classify_corpus(&diverse_corpus(), &FailingSink);
        assert!(matches!(result, Err(AnalyticsError::Artifact(_))));
    }

    #[test]
    fn test_reruns_are_reproducible() {
        let sink = CountingSink(Cell::new(0));
        let first = pipeline().classify_corpus(&diverse_corpus(), &sink).unwrap();
        let second = pipeline().classify_corpus(&diverse_corpus(), &sink).unwrap();
        assert_eq!(first.records(), second.records());
    }
}
