//! Multinomial logistic regression.

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::{argmax_rows, softmax_inplace, validate_fit_inputs, FitError, ModelFn};

/// Configuration for multinomial logistic regression.
///
/// Weights are zero-initialised and updated with full-batch gradient
/// descent on the softmax cross-entropy, so fitting is fully
/// deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticConfig {
    /// Number of gradient-descent iterations.
    pub max_iter: usize,
    /// Gradient-descent step size.
    pub learning_rate: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            learning_rate: 0.1,
        }
    }
}

impl LogisticConfig {
    /// Fit a logistic regression on the given partition.
    pub fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: &[usize],
        n_classes: usize,
    ) -> Result<LogisticModel, FitError> {
        if self.max_iter == 0 || self.learning_rate <= 0.0 {
            return Err(FitError::InvalidConfig(
                "max_iter and learning_rate must be positive".to_string(),
            ));
        }
        validate_fit_inputs(features, labels, n_classes)?;

        let n_samples = features.nrows();
        let n_features = features.ncols();
        let mut weights = Array2::<f64>::zeros((n_classes, n_features));
        let mut bias = Array1::<f64>::zeros(n_classes);

        let mut probs = vec![0.0; n_classes];
        let mut grad_w = Array2::<f64>::zeros((n_classes, n_features));
        let mut grad_b = Array1::<f64>::zeros(n_classes);

        for _ in 0..self.max_iter {
            grad_w.fill(0.0);
            grad_b.fill(0.0);

            for (i, row) in features.rows().into_iter().enumerate() {
                for k in 0..n_classes {
                    probs[k] = weights.row(k).dot(&row) + bias[k];
                }
                softmax_inplace(&mut probs);

                for k in 0..n_classes {
                    let err = probs[k] - if labels[i] == k { 1.0 } else { 0.0 };
                    grad_b[k] += err;
                    for (j, &x) in row.iter().enumerate() {
                        grad_w[[k, j]] += err * x;
                    }
                }
            }

            let step = self.learning_rate / n_samples as f64;
            weights.scaled_add(-step, &grad_w);
            bias.scaled_add(-step, &grad_b);
        }

        Ok(LogisticModel { weights, bias })
    }
}

/// A fitted multinomial logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl LogisticModel {
    fn probabilities(&self, features: ArrayView2<f64>) -> Array2<f64> {
        let n_classes = self.bias.len();
        let mut out = Array2::<f64>::zeros((features.nrows(), n_classes));
        for (i, row) in features.rows().into_iter().enumerate() {
            let mut scores: Vec<f64> = (0..n_classes)
                .map(|k| self.weights.row(k).dot(&row) + self.bias[k])
                .collect();
            softmax_inplace(&mut scores);
            for (k, &p) in scores.iter().enumerate() {
                out[[i, k]] = p;
            }
        }
        out
    }
}

impl ModelFn for LogisticModel {
    fn predict(&self, features: ArrayView2<f64>) -> Vec<usize> {
        argmax_rows(&self.probabilities(features))
    }

    fn predict_probability(&self, features: ArrayView2<f64>) -> Option<Array2<f64>> {
        Some(self.probabilities(features))
    }
}
