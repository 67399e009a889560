// file: src/classifier/split.rs
// description: seeded stratified train/test partitioning

use crate::models::CategoryLabel;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Sample indices, ascending
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

pub fn class_counts(labels: &[CategoryLabel]) -> BTreeMap<CategoryLabel, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(*label).or_insert(0) += 1;
    }
    counts
}

/// True when every class present has at least two members, the minimum
/// for one sample on each side of a stratified split.
pub fn can_stratify(labels: &[CategoryLabel]) -> bool {
    !labels.is_empty() && class_counts(labels).values().all(|&count| count >= 2)
}

/// Partition sample indices so each class contributes to the test side in
/// proportion to its size. The test side holds `ceil(n * test_size)` samples,
/// apportioned by largest remainder; every class keeps at least one training
/// sample, so a small corpus may end up with fewer test samples than classes.
pub fn stratified_split(labels: &[CategoryLabel], test_size: f64, seed: u64) -> Split {
    let total = labels.len();
    let mut members: BTreeMap<CategoryLabel, Vec<usize>> = BTreeMap::new();
    for (index, label) in labels.iter().enumerate() {
        members.entry(*label).or_default().push(index);
    }

    let test_total = ((total as f64) * test_size).ceil() as usize;

    let mut quotas: Vec<(CategoryLabel, usize, usize, f64)> = members
        .iter()
        .map(|(label, indices)| {
            let exact = test_total as f64 * indices.len() as f64 / total as f64;
            let cap = indices.len().saturating_sub(1);
            (*label, (exact.floor() as usize).min(cap), cap, exact.fract())
        })
        .collect();

    let mut remaining = test_total.saturating_sub(quotas.iter().map(|q| q.1).sum());
    let mut order: Vec<usize> = (0..quotas.len()).collect();
    order.sort_by(|&a, &b| {
        quotas[b]
            .3
            .partial_cmp(&quotas[a].3)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });

    while remaining > 0 {
        let mut assigned = false;
        for &i in &order {
            if remaining == 0 {
                break;
            }
            if quotas[i].1 < quotas[i].2 {
                quotas[i].1 += 1;
                remaining -= 1;
                assigned = true;
            }
        }
        if !assigned {
            break;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(total);
    let mut test = Vec::with_capacity(test_total);

    for (label, take, _, _) in quotas {
        let mut indices = members.remove(&label).unwrap_or_default();
        indices.shuffle(&mut rng);
        test.extend_from_slice(&indices[..take]);
        train.extend_from_slice(&indices[take..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}
