// file: src/classifier/heuristic.rs
// description: keyword-overlap category labelling
// reference: configurable keyword-based classification

use crate::config::{CategoryRule, default_categories};
use crate::models::CategoryLabel;

pub struct KeywordLabeler {
    categories: Vec<CategoryRule>,
}

impl KeywordLabeler {
    pub fn new(categories: Vec<CategoryRule>) -> Self {
        Self { categories }
    }

    pub fn scores(&self, text: &str) -> Vec<(CategoryLabel, usize)> {
        keyword_scores(text, &self.categories)
    }

    /// Category with the strictly highest score. Ties go to the category
    /// declared first; a text scoring zero everywhere is `Other`.
    pub fn label(&self, text: &str) -> CategoryLabel {
        best_category(self.scores(text))
    }

    /// Declared categories followed by `Other`, the order classes take in a
    /// trained model.
    pub fn class_order(&self) -> Vec<CategoryLabel> {
        self.categories
            .iter()
            .map(|rule| rule.category)
            .chain(std::iter::once(CategoryLabel::Other))
            .collect()
    }
}

impl Default for KeywordLabeler {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

/// Number of each category's keywords present anywhere in the text,
/// case-insensitively. Presence counts once per keyword regardless of how
/// often it occurs.
pub fn keyword_scores(text: &str, categories: &[CategoryRule]) -> Vec<(CategoryLabel, usize)> {
    let lowered = text.to_lowercase();

    categories
        .iter()
        .map(|rule| {
            let score = rule
                .keywords
                .iter()
                .filter(|keyword| lowered.contains(&keyword.to_lowercase()))
                .count();
            (rule.category, score)
        })
        .collect()
}

fn best_category(scores: Vec<(CategoryLabel, usize)>) -> CategoryLabel {
    let mut best = (CategoryLabel::Other, 0);
    for (category, score) in scores {
        if score > best.1 {
            best = (category, score);
        }
    }
    best.0
}

pub fn heuristic_label(text: &str, categories: &[CategoryRule]) -> CategoryLabel {
    best_category(keyword_scores(text, categories))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_with_default_rules() {
        let labeler = KeywordLabeler::default();

        assert_eq!(
            labeler.label("The patient received treatment for the disease."),
            CategoryLabel::Health
        );
        assert_eq!(
            labeler.label("Our company entered a new market."),
            CategoryLabel::Business
        );
    }

    #[test]
    fn test_no_keywords_is_other() {
        let labeler = KeywordLabeler::default();
        assert_eq!(labeler.label("Nothing relevant here."), CategoryLabel::Other);
        assert_eq!(labeler.label(""), CategoryLabel::Other);
    }

    #[test]
    fn test_presence_not_frequency() {
        let labeler = KeywordLabeler::default();
        let text = "market market market market. research and experiment.";

        let scores = labeler.scores(text);
        assert_eq!(scores[0], (CategoryLabel::Science, 2));
        assert_eq!(scores[2], (CategoryLabel::Business, 1));
        assert_eq!(labeler.label(text), CategoryLabel::Science);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let labeler = KeywordLabeler::default();
        let text = "A software company.";

        assert_eq!(labeler.label(text), CategoryLabel::Technology);

        let reversed: Vec<CategoryRule> = default_categories().into_iter().rev().collect();
        assert_eq!(heuristic_label(text, &reversed), CategoryLabel::Business);
    }

    #[test]
    fn test_class_order_follows_configuration() {
        let labeler = KeywordLabeler::new(vec![
            CategoryRule::new(CategoryLabel::Health, &["patient"]),
            CategoryRule::new(CategoryLabel::Science, &["research"]),
        ]);
        assert_eq!(
            labeler.class_order(),
            vec![CategoryLabel::Health, CategoryLabel::Science, CategoryLabel::Other]
        );
    }

    #[test]
    fn test_case_insensitive_substring() {
        let rules = vec![CategoryRule::new(CategoryLabel::Education, &["course"])];
        assert_eq!(
            heuristic_label("COURSEWORK is due", &rules),
            CategoryLabel::Education
        );
    }

    #[test]
    fn test_deterministic() {
        let labeler = KeywordLabeler::default();
        let text = "digital health study";
        let first = labeler.label(text);
        for _ in 0..10 {
            assert_eq!(labeler.label(text), first);
        }
    }
}
