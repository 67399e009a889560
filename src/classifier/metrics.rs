// file: src/classifier/metrics.rs
// description: per-class precision, recall and f1 reporting

use crate::models::CategoryLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: CategoryLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total_support: usize,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ClassificationReport {
    /// Report over the labels that occur in either `truth` or `predicted`.
    /// Undefined ratios (no predictions or no support) count as zero.
    pub fn new(truth: &[CategoryLabel], predicted: &[CategoryLabel]) -> Self {
        let labels: BTreeSet<CategoryLabel> = truth.iter().chain(predicted).copied().collect();
        let pairs: Vec<(CategoryLabel, CategoryLabel)> =
            truth.iter().copied().zip(predicted.iter().copied()).collect();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let true_positive = pairs.iter().filter(|(t, p)| *t == label && *p == label).count();
                let predicted_positive = pairs.iter().filter(|(_, p)| *p == label).count();
                let support = pairs.iter().filter(|(t, _)| *t == label).count();

                let precision = ratio(true_positive, predicted_positive);
                let recall = ratio(true_positive, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let total_support = pairs.len();
        let correct = pairs.iter().filter(|(t, p)| t == p).count();

        let class_count = classes.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / class_count,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / class_count,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / class_count,
        };

        let weight = |value: fn(&ClassMetrics) -> f64| -> f64 {
            if total_support == 0 {
                return 0.0;
            }
            classes
                .iter()
                .map(|c| value(c) * c.support as f64)
                .sum::<f64>()
                / total_support as f64
        };
        let weighted_avg = AverageMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1: weight(|c| c.f1),
        };

        Self {
            accuracy: ratio(correct, total_support),
            classes,
            macro_avg,
            weighted_avg,
            total_support,
        }
    }

    pub fn format(&self) -> String {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.as_str().len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        let mut output = format!(
            "{:>width$} {:>9} {:>9} {:>9} {:>9}\n\n",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            width = width
        );

        for class in &self.classes {
            output.push_str(&format!(
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
                class.label.as_str(),
                class.precision,
                class.recall,
                class.f1,
                class.support,
                width = width
            ));
        }

        output.push('\n');
        output.push_str(&format!(
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}\n",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total_support,
            width = width
        ));

        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            output.push_str(&format!(
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}\n",
                name,
                avg.precision,
                avg.recall,
                avg.f1,
                self.total_support,
                width = width
            ));
        }

        output
    }
}
