//! Random forest classifier.
//!
//! Bagged CART-style trees: each tree is grown on a seeded bootstrap
//! sample with a random √d feature subset considered at every split.
//! Trees are stored as flat node arrays.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use super::{argmax_rows, validate_fit_inputs, FitError, ModelFn};

/// Configuration for the random forest variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum node size eligible for splitting.
    pub min_samples_split: usize,
}

impl Default for RandomForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 16,
            min_samples_split: 2,
        }
    }
}

/// One node of a classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TreeNode {
    /// Internal split: rows with `value < threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding a class probability distribution.
    Leaf { distribution: Vec<f64> },
}

/// A single classification tree stored as a flat node array.
///
/// Node 0 is the root; children are indices into the array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ClassificationTree {
    nodes: Vec<TreeNode>,
}

impl ClassificationTree {
    /// Walk the tree for one row and return the leaf distribution.
    fn distribution(&self, row: ArrayView1<f64>) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] < *threshold { *left } else { *right };
                }
                TreeNode::Leaf { distribution } => return distribution,
            }
        }
    }
}

/// Gini impurity of a class-count vector.
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

struct TreeBuilder<'a, 'b, 'c> {
    features: ArrayView2<'a, f64>,
    labels: &'b [usize],
    n_classes: usize,
    max_depth: usize,
    min_samples_split: usize,
    n_subset: usize,
    n_total: f64,
    importances: &'c mut [f64],
    nodes: Vec<TreeNode>,
}

impl TreeBuilder<'_, '_, '_> {
    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.labels[i]] += 1;
        }
        counts
    }

    fn leaf(&mut self, counts: &[usize], total: usize) -> usize {
        let distribution = counts
            .iter()
            .map(|&c| if total > 0 { c as f64 / total as f64 } else { 0.0 })
            .collect();
        self.nodes.push(TreeNode::Leaf { distribution });
        self.nodes.len() - 1
    }

    /// Find the best (feature, threshold, gain) over a random feature subset.
    fn best_split(
        &self,
        indices: &[usize],
        parent_gini: f64,
        rng: &mut StdRng,
    ) -> Option<(usize, f64, f64)> {
        let n = indices.len();
        let total_counts = self.class_counts(indices);
        let mut candidates: Vec<usize> = (0..self.features.ncols()).collect();
        candidates.shuffle(rng);
        candidates.truncate(self.n_subset);
        // Scan candidates in index order so the chosen split does not
        // depend on the shuffle beyond subset membership.
        candidates.sort_unstable();

        let mut best: Option<(usize, f64, f64)> = None;

        for &feature in &candidates {
            let mut ordered: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.features[[i, feature]], self.labels[i]))
                .collect();
            ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_counts = vec![0usize; self.n_classes];
            for (split_at, window) in ordered.windows(2).enumerate() {
                left_counts[window[0].1] += 1;
                let (value, next_value) = (window[0].0, window[1].0);
                if value == next_value {
                    continue;
                }

                let n_left = split_at + 1;
                let n_right = n - n_left;
                let right_counts: Vec<usize> = total_counts
                    .iter()
                    .zip(&left_counts)
                    .map(|(&c, &l)| c - l)
                    .collect();

                let weighted = (n_left as f64 * gini(&left_counts, n_left)
                    + n_right as f64 * gini(&right_counts, n_right))
                    / n as f64;
                let gain = parent_gini - weighted;

                let threshold = (value + next_value) / 2.0;
                if gain > 1e-12 && best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((feature, threshold, gain));
                }
            }
        }

        best
    }

    fn build(&mut self, indices: &[usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(indices);
        let total = indices.len();
        let parent_gini = gini(&counts, total);

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if is_pure || depth >= self.max_depth || total < self.min_samples_split {
            return self.leaf(&counts, total);
        }

        let Some((feature, threshold, gain)) = self.best_split(indices, parent_gini, rng) else {
            return self.leaf(&counts, total);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.features[[i, feature]] < threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return self.leaf(&counts, total);
        }

        self.importances[feature] += total as f64 / self.n_total * gain;

        let node = self.nodes.len();
        self.nodes.push(TreeNode::Split {
            feature,
            threshold,
            left: 0,
            right: 0,
        });
        let left = self.build(&left_idx, depth + 1, rng);
        let right = self.build(&right_idx, depth + 1, rng);
        if let TreeNode::Split {
            left: l, right: r, ..
        } = &mut self.nodes[node]
        {
            *l = left;
            *r = right;
        }
        node
    }
}

impl RandomForestConfig {
    /// Fit a random forest on the given partition.
    pub fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: &[usize],
        n_classes: usize,
        seed: u64,
    ) -> Result<RandomForestModel, FitError> {
        if self.n_trees == 0 {
            return Err(FitError::InvalidConfig("n_trees must be positive".to_string()));
        }
        validate_fit_inputs(features, labels, n_classes)?;

        let n_samples = features.nrows();
        let n_features = features.ncols();
        let n_subset = ((n_features as f64).sqrt().round() as usize).max(1);
        let mut importances = vec![0.0; n_features];
        let mut trees = Vec::with_capacity(self.n_trees);

        for t in 0..self.n_trees {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
            let bootstrap: Vec<usize> =
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

            let mut builder = TreeBuilder {
                features,
                labels,
                n_classes,
                max_depth: self.max_depth,
                min_samples_split: self.min_samples_split,
                n_subset,
                n_total: n_samples as f64,
                importances: &mut importances,
                nodes: Vec::new(),
            };
            builder.build(&bootstrap, 0, &mut rng);
            trees.push(ClassificationTree {
                nodes: builder.nodes,
            });
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for w in &mut importances {
                *w /= total;
            }
        }

        Ok(RandomForestModel {
            trees,
            n_classes,
            importances,
        })
    }
}

/// A fitted random forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModel {
    trees: Vec<ClassificationTree>,
    n_classes: usize,
    importances: Vec<f64>,
}

impl RandomForestModel {
    fn probabilities(&self, features: ArrayView2<f64>) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((features.nrows(), self.n_classes));
        let n_trees = self.trees.len() as f64;
        for (i, row) in features.rows().into_iter().enumerate() {
            for tree in &self.trees {
                for (k, &p) in tree.distribution(row).iter().enumerate() {
                    out[[i, k]] += p;
                }
            }
            if n_trees > 0.0 {
                for k in 0..self.n_classes {
                    out[[i, k]] /= n_trees;
                }
            }
        }
        out
    }
}

impl ModelFn for RandomForestModel {
    fn predict(&self, features: ArrayView2<f64>) -> Vec<usize> {
        argmax_rows(&self.probabilities(features))
    }

    fn predict_probability(&self, features: ArrayView2<f64>) -> Option<Array2<f64>> {
        Some(self.probabilities(features))
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        Some(self.importances.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn separable() -> (Array2<f64>, Vec<usize>) {
        let features = array![
            [0.0, 5.0],
            [0.2, 4.0],
            [0.1, 6.0],
            [0.3, 5.5],
            [3.0, 5.0],
            [3.2, 4.5],
            [3.1, 6.0],
            [2.9, 5.2],
        ];
        let labels = vec![0, 0, 0, 0, 1, 1, 1, 1];
        (features, labels)
    }

    #[test]
    fn gini_bounds() {
        assert_abs_diff_eq!(gini(&[4, 0], 4), 0.0);
        assert_abs_diff_eq!(gini(&[2, 2], 4), 0.5);
        assert_abs_diff_eq!(gini(&[0, 0], 0), 0.0);
    }

    #[test]
    fn learns_separable_data() {
        let (features, labels) = separable();
        let config = RandomForestConfig {
            n_trees: 25,
            ..Default::default()
        };
        let model = config.fit(features.view(), &labels, 2, 42).unwrap();
        assert_eq!(model.predict(features.view()), labels);
    }

    #[test]
    fn probabilities_are_valid() {
        let (features, labels) = separable();
        let config = RandomForestConfig {
            n_trees: 25,
            ..Default::default()
        };
        let model = config.fit(features.view(), &labels, 2, 42).unwrap();
        let probs = model.predict_probability(features.view()).unwrap();
        for row in probs.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
            assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn importances_favor_informative_feature() {
        let (features, labels) = separable();
        let config = RandomForestConfig {
            n_trees: 50,
            ..Default::default()
        };
        let model = config.fit(features.view(), &labels, 2, 42).unwrap();
        let importances = model.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        // Feature 0 separates the classes; feature 1 is noise.
        assert!(importances[0] > importances[1]);
        assert_abs_diff_eq!(importances.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn same_seed_same_model() {
        let (features, labels) = separable();
        let config = RandomForestConfig {
            n_trees: 10,
            ..Default::default()
        };
        let a = config.fit(features.view(), &labels, 2, 7).unwrap();
        let b = config.fit(features.view(), &labels, 2, 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_class_gives_certain_leaf() {
        let features = array![[1.0], [2.0], [3.0]];
        let config = RandomForestConfig {
            n_trees: 5,
            ..Default::default()
        };
        let model = config.fit(features.view(), &[0, 0, 0], 1, 42).unwrap();
        let probs = model.predict_probability(features.view()).unwrap();
        assert_abs_diff_eq!(probs[[0, 0]], 1.0);
    }
}
