// file: src/classifier/naive_bayes.rs
// description: multinomial naive bayes over tf-idf feature rows

use crate::error::{AnalyticsError, Result};
use crate::models::CategoryLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    smoothing: f64,
    /// Classes seen in training, in category declaration order
    classes: Vec<CategoryLabel>,
    class_log_prior: Vec<f64>,
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    /// Fit on labelled rows. Classes take their position from `class_order`;
    /// a label missing from it is placed after the ordered ones.
    pub fn fit(
        rows: &[Vec<f64>],
        labels: &[CategoryLabel],
        class_order: &[CategoryLabel],
        smoothing: f64,
    ) -> Result<Self> {
        if rows.is_empty() {
            return Err(AnalyticsError::Validation(
                "cannot fit a model on zero samples".to_string(),
            ));
        }
        if rows.len() != labels.len() {
            return Err(AnalyticsError::Validation(format!(
                "{} samples but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        let feature_count = rows[0].len();
        let mut classes: Vec<CategoryLabel> = class_order
            .iter()
            .copied()
            .filter(|class| labels.contains(class))
            .collect();
        for label in labels {
            if !classes.contains(label) {
                classes.push(*label);
            }
        }

        let total = rows.len() as f64;
        let mut class_log_prior = Vec::with_capacity(classes.len());
        let mut feature_log_prob = Vec::with_capacity(classes.len());

        for class in &classes {
            let mut counts = vec![0.0; feature_count];
            let mut members = 0usize;

            for (row, label) in rows.iter().zip(labels) {
                if label != class {
                    continue;
                }
                members += 1;
                for (count, value) in counts.iter_mut().zip(row) {
                    *count += value;
                }
            }

            class_log_prior.push((members as f64 / total).ln());

            let denominator = counts.iter().sum::<f64>() + smoothing * feature_count as f64;
            feature_log_prob.push(
                counts
                    .iter()
                    .map(|count| ((count + smoothing) / denominator).ln())
                    .collect(),
            );
        }

        Ok(Self {
            smoothing,
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    /// Joint log-likelihood of `row` under each class.
    pub fn log_likelihoods(&self, row: &[f64]) -> Vec<(CategoryLabel, f64)> {
        self.classes
            .iter()
            .zip(&self.class_log_prior)
            .zip(&self.feature_log_prob)
            .map(|((class, prior), log_probs)| {
                let evidence: f64 = row.iter().zip(log_probs).map(|(x, lp)| x * lp).sum();
                (*class, prior + evidence)
            })
            .collect()
    }

    /// Most likely class; equal scores resolve to the earlier class.
    pub fn predict(&self, row: &[f64]) -> CategoryLabel {
        let mut best: Option<(CategoryLabel, f64)> = None;

        for (class, score) in self.log_likelihoods(row) {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((class, score)),
            }
        }

        best.map(|(class, _)| class).unwrap_or(CategoryLabel::Other)
    }

    pub fn classes(&self) -> &[CategoryLabel] {
        &self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separable_classes() {
        let rows = vec![
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![0.0, 1.0],
            vec![0.1, 0.9],
        ];
        let labels = vec![
            CategoryLabel::Science,
            CategoryLabel::Science,
            CategoryLabel::Health,
            CategoryLabel::Health,
        ];

        let model = MultinomialNb::fit(&rows, &labels, &CategoryLabel::ALL, 1.0).unwrap();
        assert_eq!(model.classes(), &[CategoryLabel::Science, CategoryLabel::Health]);
        assert_eq!(model.predict(&[1.0, 0.0]), CategoryLabel::Science);
        assert_eq!(model.predict(&[0.0, 1.0]), CategoryLabel::Health);
    }

    #[test]
    fn test_single_class_predicts_that_class() {
        let rows = vec![vec![0.5, 0.5], vec![1.0, 0.0]];
        let labels = vec![CategoryLabel::Other, CategoryLabel::Other];

        let model = MultinomialNb::fit(&rows, &labels, &CategoryLabel::ALL, 1.0).unwrap();
        assert_eq!(model.predict(&[0.0, 1.0]), CategoryLabel::Other);
    }

    #[test]
    fn test_tie_resolves_to_earlier_class() {
        let rows = vec![vec![1.0], vec![1.0]];
        let labels = vec![CategoryLabel::Business, CategoryLabel::Technology];

        let model = MultinomialNb::fit(&rows, &labels, &CategoryLabel::ALL, 1.0).unwrap();
        assert_eq!(model.predict(&[1.0]), CategoryLabel::Technology);
    }

    #[test]
    fn test_class_order_comes_from_configuration() {
        let rows = vec![vec![1.0], vec![1.0]];
        let labels = vec![CategoryLabel::Business, CategoryLabel::Technology];
        let order = [
            CategoryLabel::Business,
            CategoryLabel::Technology,
            CategoryLabel::Other,
        ];

        let model = MultinomialNb::fit(&rows, &labels, &order, 1.0).unwrap();
        assert_eq!(
            model.classes(),
            &[CategoryLabel::Business, CategoryLabel::Technology]
        );
        assert_eq!(model.predict(&[1.0]), CategoryLabel::Business);
    }

    #[test]
    fn test_unordered_label_is_placed_last() {
        let rows = vec![vec![1.0], vec![0.5]];
        let labels = vec![CategoryLabel::Other, CategoryLabel::Health];

        let model = MultinomialNb::fit(&rows, &labels, &[CategoryLabel::Health], 1.0).unwrap();
        assert_eq!(model.classes(), &[CategoryLabel::Health, CategoryLabel::Other]);
    }

    #[test]
    fn test_prior_decides_without_features() {
        let rows = vec![vec![], vec![], vec![]];
        let labels = vec![
            CategoryLabel::Health,
            CategoryLabel::Science,
            CategoryLabel::Science,
        ];

        let model = MultinomialNb::fit(&rows, &labels, &CategoryLabel::ALL, 1.0).unwrap();
        assert_eq!(model.predict(&[]), CategoryLabel::Science);
    }

    #[test]
    fn test_rejects_mismatched_input() {
        assert!(MultinomialNb::fit(&[], &[], &CategoryLabel::ALL, 1.0).is_err());
        assert!(MultinomialNb::fit(&[vec![1.0]], &[], &CategoryLabel::ALL, 1.0).is_err());
    }
}
