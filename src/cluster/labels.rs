//! Helpers for consuming label arrays.
//!
//! The fits return raw cluster ids (set roots), which are sparse and depend on
//! the strategy. These helpers compact ids and compare two labelings of the
//! same points. Comparing arrays of different lengths is a caller bug and panics.

use std::collections::{HashMap, HashSet};

use super::dbscan::{Label, Labels, NOISE};

/// Renumber cluster ids densely from 0 in order of first appearance.
/// [`NOISE`] is kept as is.
pub fn relabel_dense(labels: &[Label]) -> Labels {
    let mut ids: HashMap<Label, Label> = HashMap::new();
    labels
        .iter()
        .map(|&l| {
            if l == NOISE {
                return NOISE;
            }
            let next = ids.len() as Label;
            *ids.entry(l).or_insert(next)
        })
        .collect()
}

/// Number of distinct clusters (noise excluded).
pub fn cluster_count(labels: &[Label]) -> usize {
    labels
        .iter()
        .filter(|&&l| l != NOISE)
        .collect::<HashSet<_>>()
        .len()
}

/// Number of noise points.
pub fn noise_count(labels: &[Label]) -> usize {
    labels.iter().filter(|&&l| l == NOISE).count()
}

/// Fraction of indices where `a` and `b` hold the same label.
///
/// Cluster ids are compared literally; use [`partition_agreement`] to ignore
/// numbering.
///
/// # Panics
///
/// If the arrays differ in length.
pub fn agreement(a: &[Label], b: &[Label]) -> f64 {
    assert_eq!(a.len(), b.len(), "label arrays differ in length");
    if a.is_empty() {
        return 1.0;
    }
    let same = a.iter().zip(b).filter(|(x, y)| x == y).count();
    same as f64 / a.len() as f64
}

/// Fraction of points labeled consistently by `a` and `b`, up to renaming of
/// cluster ids.
///
/// Clusters of `a` are matched one-to-one to clusters of `b`, greedily by
/// overlap. A point agrees when both call it noise, or when its two clusters
/// are matched to each other.
///
/// # Panics
///
/// If the arrays differ in length.
pub fn partition_agreement(a: &[Label], b: &[Label]) -> f64 {
    assert_eq!(a.len(), b.len(), "label arrays differ in length");
    if a.is_empty() {
        return 1.0;
    }

    let mut both_noise = 0usize;
    let mut overlap: HashMap<(Label, Label), usize> = HashMap::new();
    for (&x, &y) in a.iter().zip(b) {
        match (x == NOISE, y == NOISE) {
            (true, true) => both_noise += 1,
            (false, false) => *overlap.entry((x, y)).or_insert(0) += 1,
            _ => {}
        }
    }

    let mut pairs: Vec<((Label, Label), usize)> = overlap.into_iter().collect();
    // Largest overlap first; ties broken by ids so the result is deterministic.
    pairs.sort_by(|p, q| q.1.cmp(&p.1).then(p.0.cmp(&q.0)));

    let mut used_a = HashSet::new();
    let mut used_b = HashSet::new();
    let mut matched = both_noise;
    for ((x, y), count) in pairs {
        if used_a.contains(&x) || used_b.contains(&y) {
            continue;
        }
        used_a.insert(x);
        used_b.insert(y);
        matched += count;
    }
    matched as f64 / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relabel_compacts_ids() {
        let labels = vec![7, 7, NOISE, 3, 12, 3, NOISE];
        assert_eq!(relabel_dense(&labels), vec![0, 0, NOISE, 1, 2, 1, NOISE]);
        assert!(relabel_dense(&[]).is_empty());
    }

    #[test]
    fn counts() {
        let labels = vec![4, 4, NOISE, 9, NOISE];
        assert_eq!(cluster_count(&labels), 2);
        assert_eq!(noise_count(&labels), 2);
    }

    #[test]
    fn literal_agreement() {
        assert_eq!(agreement(&[0, 1, NOISE, 2], &[0, 1, NOISE, 3]), 0.75);
        assert_eq!(agreement(&[], &[]), 1.0);
    }

    #[test]
    fn partition_agreement_ignores_numbering() {
        let a = vec![0, 0, 1, 1, NOISE];
        let b = vec![5, 5, 2, 2, NOISE];
        assert_eq!(partition_agreement(&a, &b), 1.0);
    }

    #[test]
    fn partition_agreement_penalizes_merges() {
        // `b` merges the two clusters of `a`: only the larger side can match.
        let a = vec![0, 0, 0, 1, 1];
        let b = vec![4, 4, 4, 4, 4];
        assert_eq!(partition_agreement(&a, &b), 0.6);
    }

    #[test]
    fn partition_agreement_counts_noise_mismatch() {
        let a = vec![0, 0, NOISE, NOISE];
        let b = vec![1, 1, 1, NOISE];
        assert_eq!(partition_agreement(&a, &b), 0.75);
    }

    #[test]
    #[should_panic(expected = "differ in length")]
    fn length_mismatch_panics() {
        agreement(&[0, 1], &[0]);
    }
}
