//! Gradient-boosting classifier.
//!
//! Multinomial softmax boosting: each round fits one depth-limited
//! regression tree per class to the residuals (one-hot target minus
//! current probability) and adds it to the class score with shrinkage.
//! Leaf values use the Friedman multinomial update. Fitting considers
//! every feature at every split and is fully deterministic.

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{argmax_rows, softmax_inplace, validate_fit_inputs, FitError, ModelFn};

/// Configuration for the gradient-boosting variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostConfig {
    /// Number of boosting rounds.
    pub n_rounds: usize,
    /// Shrinkage applied to every tree's contribution.
    pub learning_rate: f64,
    /// Maximum regression tree depth.
    pub max_depth: usize,
    /// Minimum node size eligible for splitting.
    pub min_samples_split: usize,
}

impl Default for GradientBoostConfig {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_split: 2,
        }
    }
}

/// One node of a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum RegressionNode {
    /// Internal split: rows with `value < threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding the boosting update value.
    Leaf { value: f64 },
}

/// A regression tree stored as a flat node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RegressionTree {
    nodes: Vec<RegressionNode>,
}

impl RegressionTree {
    fn value(&self, row: ArrayView1<f64>) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                RegressionNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] < *threshold { *left } else { *right };
                }
                RegressionNode::Leaf { value } => return *value,
            }
        }
    }
}

/// Friedman multinomial leaf value for the residuals reaching a leaf.
fn leaf_value(residuals: &[f64], indices: &[usize], n_classes: usize) -> f64 {
    let numerator: f64 = indices.iter().map(|&i| residuals[i]).sum();
    let denominator: f64 = indices
        .iter()
        .map(|&i| residuals[i].abs() * (1.0 - residuals[i].abs()))
        .sum();
    if denominator.abs() < 1e-12 {
        return 0.0;
    }
    (n_classes as f64 - 1.0) / n_classes as f64 * numerator / denominator
}

struct RegressionTreeBuilder<'a, 'b, 'c> {
    features: ArrayView2<'a, f64>,
    residuals: &'b [f64],
    n_classes: usize,
    max_depth: usize,
    min_samples_split: usize,
    importances: &'c mut [f64],
    nodes: Vec<RegressionNode>,
}

impl RegressionTreeBuilder<'_, '_, '_> {
    fn leaf(&mut self, indices: &[usize]) -> usize {
        let value = leaf_value(self.residuals, indices, self.n_classes);
        self.nodes.push(RegressionNode::Leaf { value });
        self.nodes.len() - 1
    }

    /// Best split by squared-error improvement over all features.
    ///
    /// With `sse = Σr² − (Σr)²/n` and `Σr²` constant across splits, the
    /// improvement reduces to `(ΣL)²/nL + (ΣR)²/nR − (Σ)²/n`.
    fn best_split(&self, indices: &[usize]) -> Option<(usize, f64, f64)> {
        let n = indices.len();
        let total: f64 = indices.iter().map(|&i| self.residuals[i]).sum();
        let baseline = total * total / n as f64;

        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..self.features.ncols() {
            let mut ordered: Vec<(f64, f64)> = indices
                .iter()
                .map(|&i| (self.features[[i, feature]], self.residuals[i]))
                .collect();
            ordered.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_sum = 0.0;
            for (split_at, window) in ordered.windows(2).enumerate() {
                left_sum += window[0].1;
                let (value, next_value) = (window[0].0, window[1].0);
                if value == next_value {
                    continue;
                }

                let n_left = (split_at + 1) as f64;
                let n_right = n as f64 - n_left;
                let right_sum = total - left_sum;
                let improvement =
                    left_sum * left_sum / n_left + right_sum * right_sum / n_right - baseline;

                let threshold = (value + next_value) / 2.0;
                if improvement > 1e-12 && best.map_or(true, |(_, _, g)| improvement > g) {
                    best = Some((feature, threshold, improvement));
                }
            }
        }

        best
    }

    fn build(&mut self, indices: &[usize], depth: usize) -> usize {
        if depth >= self.max_depth || indices.len() < self.min_samples_split {
            return self.leaf(indices);
        }

        let Some((feature, threshold, improvement)) = self.best_split(indices) else {
            return self.leaf(indices);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.features[[i, feature]] < threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return self.leaf(indices);
        }

        self.importances[feature] += improvement;

        let node = self.nodes.len();
        self.nodes.push(RegressionNode::Split {
            feature,
            threshold,
            left: 0,
            right: 0,
        });
        let left = self.build(&left_idx, depth + 1);
        let right = self.build(&right_idx, depth + 1);
        if let RegressionNode::Split {
            left: l, right: r, ..
        } = &mut self.nodes[node]
        {
            *l = left;
            *r = right;
        }
        node
    }
}

impl GradientBoostConfig {
    /// Fit a gradient-boosting classifier on the given partition.
    pub fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: &[usize],
        n_classes: usize,
    ) -> Result<GradientBoostModel, FitError> {
        if self.n_rounds == 0 || self.learning_rate <= 0.0 {
            return Err(FitError::InvalidConfig(
                "n_rounds and learning_rate must be positive".to_string(),
            ));
        }
        validate_fit_inputs(features, labels, n_classes)?;

        let n_samples = features.nrows();
        let n_features = features.ncols();
        let all_indices: Vec<usize> = (0..n_samples).collect();

        let mut scores = Array2::<f64>::zeros((n_samples, n_classes));
        let mut residuals = vec![0.0; n_samples];
        let mut importances = vec![0.0; n_features];
        let mut rounds: Vec<Vec<RegressionTree>> = Vec::with_capacity(self.n_rounds);

        for _ in 0..self.n_rounds {
            let mut probs = scores.clone();
            for mut row in probs.rows_mut() {
                softmax_inplace(row.as_slice_mut().expect("row-major layout"));
            }

            let mut round_trees = Vec::with_capacity(n_classes);
            for k in 0..n_classes {
                for i in 0..n_samples {
                    let target = if labels[i] == k { 1.0 } else { 0.0 };
                    residuals[i] = target - probs[[i, k]];
                }

                let mut builder = RegressionTreeBuilder {
                    features,
                    residuals: &residuals,
                    n_classes,
                    max_depth: self.max_depth,
                    min_samples_split: self.min_samples_split,
                    importances: &mut importances,
                    nodes: Vec::new(),
                };
                builder.build(&all_indices, 0);
                let tree = RegressionTree {
                    nodes: builder.nodes,
                };

                for (i, row) in features.rows().into_iter().enumerate() {
                    scores[[i, k]] += self.learning_rate * tree.value(row);
                }
                round_trees.push(tree);
            }
            rounds.push(round_trees);
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for w in &mut importances {
                *w /= total;
            }
        }

        Ok(GradientBoostModel {
            rounds,
            n_classes,
            learning_rate: self.learning_rate,
            importances,
        })
    }
}

/// A fitted gradient-boosting classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostModel {
    rounds: Vec<Vec<RegressionTree>>,
    n_classes: usize,
    learning_rate: f64,
    importances: Vec<f64>,
}

impl GradientBoostModel {
    fn probabilities(&self, features: ArrayView2<f64>) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((features.nrows(), self.n_classes));
        for (i, row) in features.rows().into_iter().enumerate() {
            let mut scores = vec![0.0; self.n_classes];
            for round in &self.rounds {
                for (k, tree) in round.iter().enumerate() {
                    scores[k] += self.learning_rate * tree.value(row);
                }
            }
            softmax_inplace(&mut scores);
            for (k, &p) in scores.iter().enumerate() {
                out[[i, k]] = p;
            }
        }
        out
    }
}

impl ModelFn for GradientBoostModel {
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
