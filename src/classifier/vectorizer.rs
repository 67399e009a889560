// file: src/classifier/vectorizer.rs
// description: tf-idf feature extraction over a fixed-size corpus vocabulary

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

lazy_static! {
    // Tokens of two or more word characters
    static ref TOKEN: Regex = Regex::new(r"\b\w\w+\b").expect("TOKEN regex is valid");
}

pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    max_features: usize,
    /// Term to column index; columns follow alphabetical term order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights of `documents` and return their
    /// feature rows.
    pub fn fit_transform(documents: &[&str], max_features: usize) -> (Self, Vec<Vec<f64>>) {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|doc| tokenize(doc)).collect();
        let vectorizer = Self::fit_tokens(&tokenized, max_features);
        let rows = tokenized
            .iter()
            .map(|tokens| vectorizer.transform_tokens(tokens))
            .collect();
        (vectorizer, rows)
    }

    fn fit_tokens(tokenized: &[Vec<String>], max_features: usize) -> Self {
        let mut term_counts: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();

        for tokens in tokenized {
            for token in tokens {
                *term_counts.entry(token.as_str()).or_insert(0) += 1;
            }
            let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
            for token in unique {
                *doc_freq.entry(token).or_insert(0) += 1;
            }
        }

        // Most frequent terms first, ties alphabetical
        let mut ranked: Vec<(&str, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);

        let mut terms: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        let doc_count = tokenized.len() as f64;
        let idf = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + doc_count) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term.to_string(), index))
            .collect();

        Self {
            max_features,
            vocabulary,
            idf,
        }
    }

    pub fn transform(&self, text: &str) -> Vec<f64> {
        self.transform_tokens(&tokenize(text))
    }

    fn transform_tokens(&self, tokens: &[String]) -> Vec<f64> {
        let mut row = vec![0.0; self.vocabulary.len()];

        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token) {
                row[index] += 1.0;
            }
        }

        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in row.iter_mut() {
                *value /= norm;
            }
        }

        row
    }

    pub fn feature_count(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn max_features(&self) -> usize {
        self.max_features
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }
}
