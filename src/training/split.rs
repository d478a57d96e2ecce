//! Deterministic data splitting for training and cross-validation.

use rand::prelude::*;

/// A train/test partition of row indices.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    /// Row indices of the training partition, ascending.
    pub train: Vec<usize>,
    /// Row indices of the held-out partition, ascending.
    pub test: Vec<usize>,
}

/// Stratified train/test split.
///
/// Rows are grouped by label; each class contributes a proportional share
/// of the held-out partition while always keeping at least one row of a
/// multi-row class in training. When the proportional shares all round to
/// zero (tiny datasets), one row is still moved to the held-out partition
/// so every variant is evaluated on the same non-empty set.
///
/// Classes are processed in code order and shuffled with a seeded
/// generator, so the split is a pure function of `(labels, test_fraction,
/// seed)`.
pub fn stratified_split(
    labels: &[usize],
    n_classes: usize,
    test_fraction: f64,
    seed: u64,
) -> TrainTestSplit {
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (i, &label) in labels.iter().enumerate() {
        by_class[label].push(i);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for group in &mut by_class {
        group.shuffle(&mut rng);
        let n = group.len();
        let mut n_test = (n as f64 * test_fraction).round() as usize;
        if n > 0 {
            n_test = n_test.min(n - 1);
        }
        test.extend_from_slice(&group[..n_test]);
        train.extend_from_slice(&group[n_test..]);
    }

    // Tiny datasets can round every class share down to zero; keep the
    // held-out partition non-empty by taking one row from the largest
    // class (lowest code among ties).
    if test.is_empty() && labels.len() > 1 {
        let largest = by_class
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.len().cmp(&b.len()).then(ib.cmp(ia)))
            .map(|(i, _)| i)
            .expect("at least one class exists");
        let moved = by_class[largest][by_class[largest].len() - 1];
        train.retain(|&i| i != moved);
        test.push(moved);
    }

    train.sort_unstable();
    test.sort_unstable();
    TrainTestSplit { train, test }
}

/// Deterministic k-fold partition of `n` rows.
///
/// Returns the held-out index set of each fold. `k` is clamped to `n`;
/// fewer than two usable folds yields an empty vector and the caller
/// skips cross-validation.
pub fn k_fold_indices(n: usize, k: usize, seed: u64) -> Vec<Vec<usize>> {
    let k = k.min(n);
    if k < 2 {
        return Vec::new();
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let base = n / k;
    let remainder = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < remainder);
        let mut held_out: Vec<usize> = indices[start..start + size].to_vec();
        held_out.sort_unstable();
        folds.push(held_out);
        start += size;
    }
    folds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_is_deterministic() {
        let labels = vec![0, 1, 0, 1, 0, 1, 0, 1, 0, 1];
        let a = stratified_split(&labels, 2, 0.2, 42);
        let b = stratified_split(&labels, 2, 0.2, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn split_partitions_all_rows() {
        let labels = vec![0, 1, 2, 0, 1, 2, 0, 1, 2, 0];
        let split = stratified_split(&labels, 3, 0.3, 7);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn split_preserves_class_shares() {
        // 10 of each class; 20% held out → 2 per class.
        let labels: Vec<usize> = (0..30).map(|i| i % 3).collect();
        let split = stratified_split(&labels, 3, 0.2, 42);

        assert_eq!(split.test.len(), 6);
        for class in 0..3 {
            let held = split.test.iter().filter(|&&i| labels[i] == class).count();
            assert_eq!(held, 2);
        }
    }

    #[test]
    fn singleton_classes_still_yield_a_test_row() {
        // Five singleton classes: proportional shares all round to zero.
        let labels = vec![0, 1, 2, 3, 4];
        let split = stratified_split(&labels, 5, 0.2, 42);

        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 4);
    }

    #[test]
    fn multi_row_class_keeps_a_training_row() {
        let labels = vec![0, 0];
        let split = stratified_split(&labels, 1, 0.9, 42);
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.test.len(), 1);
    }

    #[test]
    fn k_fold_covers_every_row_once() {
        let folds = k_fold_indices(10, 5, 42);
        assert_eq!(folds.len(), 5);

        let mut all: Vec<usize> = folds.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn k_fold_clamps_to_row_count() {
        let folds = k_fold_indices(3, 5, 42);
        assert_eq!(folds.len(), 3);
        assert!(folds.iter().all(|f| f.len() == 1));
    }

    #[test]
    fn k_fold_too_small_is_empty() {
        assert!(k_fold_indices(1, 5, 42).is_empty());
        assert!(k_fold_indices(0, 5, 42).is_empty());
    }

    #[test]
    fn k_fold_is_deterministic() {
        assert_eq!(k_fold_indices(20, 5, 9), k_fold_indices(20, 5, 9));
    }
}
