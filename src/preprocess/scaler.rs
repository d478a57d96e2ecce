//! Per-column standardization.

use ndarray::{Array1, ArrayView1, ArrayView2, ArrayViewMut1};
use serde::{Deserialize, Serialize};

/// A fitted standard scaler.
///
/// Fitting records each column's mean and population standard deviation
/// (ddof = 0). Transforming subtracts the mean and divides by the
/// standard deviation; a zero-variance column contributes exactly `0.0`
/// rather than dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl StandardScaler {
    /// Fit a scaler on a sample-major matrix `[n_samples, n_features]`.
    pub fn fit(matrix: ArrayView2<f64>) -> Self {
        let n_samples = matrix.nrows() as f64;
        let n_features = matrix.ncols();

        let mut means = Array1::zeros(n_features);
        let mut stds = Array1::zeros(n_features);

        for (j, column) in matrix.columns().into_iter().enumerate() {
            let mean = column.sum() / n_samples;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_samples;
            means[j] = mean;
            stds[j] = var.sqrt();
        }

        Self { means, stds }
    }

    /// Number of feature columns the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    /// Scale a single value for the given column.
    #[inline]
    pub fn scale(&self, column: usize, value: f64) -> f64 {
        let std = self.stds[column];
        if std == 0.0 {
            0.0
        } else {
            (value - self.means[column]) / std
        }
    }

    /// Scale a feature vector in place.
    ///
    /// The vector length must equal [`n_features`](Self::n_features);
    /// callers enforce this before scaling.
    pub fn transform_inplace(&self, mut vector: ArrayViewMut1<f64>) {
        for (j, value) in vector.iter_mut().enumerate() {
            *value = self.scale(j, *value);
        }
    }

    /// Scale a feature vector, returning a new array.
    pub fn transform(&self, vector: ArrayView1<f64>) -> Array1<f64> {
        let mut out = vector.to_owned();
        self.transform_inplace(out.view_mut());
        out
    }
}
