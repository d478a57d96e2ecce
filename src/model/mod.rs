//! Classifier variants behind a capability-tagged interface.
//!
//! Every variant exposes `fit` through the [`Variant`] configuration enum
//! and the fitted result through [`FittedVariant`], which implements
//! [`ModelFn`] by delegating to the concrete type. Optional capabilities
//! (class probabilities, feature importances) default to `None`; callers
//! branch on capability presence, never on concrete type.
//!
//! # Available Variants
//!
//! - [`RandomForestConfig`]: bagged decision trees; probabilities and
//!   importances.
//! - [`GradientBoostConfig`]: boosted shallow regression trees;
//!   probabilities and importances.
//! - [`LogisticConfig`]: multinomial logistic regression; probabilities
//!   only.

mod boost;
mod forest;
mod logistic;

pub use boost::{GradientBoostConfig, GradientBoostModel};
pub use forest::{RandomForestConfig, RandomForestModel};
pub use logistic::{LogisticConfig, LogisticModel};

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Errors raised while fitting a single classifier variant.
///
/// These are isolated per variant: the model bank records them and keeps
/// training the rest of the roster.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("training partition is empty")]
    EmptyTrainingSet,

    #[error("feature matrix has {rows} rows but {labels} labels")]
    LabelLengthMismatch { rows: usize, labels: usize },

    #[error("label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Validate the (features, labels) pair every trainer receives.
pub(crate) fn validate_fit_inputs(
    features: ArrayView2<f64>,
    labels: &[usize],
    n_classes: usize,
) -> Result<(), FitError> {
    if features.nrows() == 0 {
        return Err(FitError::EmptyTrainingSet);
    }
    if features.nrows() != labels.len() {
        return Err(FitError::LabelLengthMismatch {
            rows: features.nrows(),
            labels: labels.len(),
        });
    }
    if let Some(&label) = labels.iter().find(|&&l| l >= n_classes) {
        return Err(FitError::LabelOutOfRange { label, n_classes });
    }
    Ok(())
}

// =============================================================================
// Capability Interface
// =============================================================================

/// The contract of a fitted classifier.
///
/// `predict` is mandatory; the probability and importance capabilities
/// are optional and reported via `Option`.
pub trait ModelFn: Send + Sync {
    /// Predict a class code for each row of `features`.
    fn predict(&self, features: ArrayView2<f64>) -> Vec<usize>;

    /// Per-class probabilities `[n_samples, n_classes]`, when supported.
    fn predict_probability(&self, features: ArrayView2<f64>) -> Option<Array2<f64>> {
        let _ = features;
        None
    }

    /// Per-feature importance weights, when supported.
    ///
    /// Length equals the number of feature columns seen at fit time.
    fn feature_importances(&self) -> Option<Vec<f64>> {
        None
    }
}

// =============================================================================
// Variant (configuration enum)
// =============================================================================

/// Classifier variant configuration.
///
/// Wraps the concrete configs and provides a unified `fit` entry point
/// for the model bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    /// Bagged decision trees.
    RandomForest(RandomForestConfig),
    /// Boosted shallow regression trees.
    GradientBoost(GradientBoostConfig),
    /// Multinomial logistic regression.
    Logistic(LogisticConfig),
}

impl Variant {
    /// Fit this variant on the given training partition.
    ///
    /// `features` is sample-major `[n_samples, n_features]`; `labels` are
    /// class codes in `0..n_classes`. All internal randomness derives
    /// from `seed`.
    pub fn fit(
        &self,
        features: ArrayView2<f64>,
        labels: &[usize],
        n_classes: usize,
        seed: u64,
    ) -> Result<FittedVariant, FitError> {
        match self {
            Variant::RandomForest(config) => config
                .fit(features, labels, n_classes, seed)
                .map(FittedVariant::RandomForest),
            Variant::GradientBoost(config) => config
                .fit(features, labels, n_classes)
                .map(FittedVariant::GradientBoost),
            Variant::Logistic(config) => config
                .fit(features, labels, n_classes)
                .map(FittedVariant::Logistic),
        }
    }
}

// =============================================================================
// FittedVariant (fitted model enum)
// =============================================================================

/// A fitted classifier variant.
///
/// Implements [`ModelFn`] by delegating to the underlying model, so the
/// selector and the inference engine never match on the concrete type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedVariant {
    /// Fitted random forest.
    RandomForest(RandomForestModel),
    /// Fitted gradient-boosting model.
    GradientBoost(GradientBoostModel),
    /// Fitted logistic regression.
    Logistic(LogisticModel),
}

impl ModelFn for FittedVariant {
    fn predict(&self, features: ArrayView2<f64>) -> Vec<usize> {
        match self {
            FittedVariant::RandomForest(m) => m.predict(features),
            FittedVariant::GradientBoost(m) => m.predict(features),
            FittedVariant::Logistic(m) => m.predict(features),
        }
    }

    fn predict_probability(&self, features: ArrayView2<f64>) -> Option<Array2<f64>> {
        match self {
            FittedVariant::RandomForest(m) => m.predict_probability(features),
            FittedVariant::GradientBoost(m) => m.predict_probability(features),
            FittedVariant::Logistic(m) => m.predict_probability(features),
        }
    }

    fn feature_importances(&self) -> Option<Vec<f64>> {
        match self {
            FittedVariant::RandomForest(m) => m.feature_importances(),
            FittedVariant::GradientBoost(m) => m.feature_importances(),
            FittedVariant::Logistic(m) => m.feature_importances(),
        }
    }
}

/// Pick the most probable class per row, lowest code winning ties.
pub(crate) fn argmax_rows(probabilities: &Array2<f64>) -> Vec<usize> {
    probabilities
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0usize;
            let mut best_p = f64::NEG_INFINITY;
            for (k, &p) in row.iter().enumerate() {
                if p > best_p {
                    best_p = p;
                    best = k;
                }
            }
            best
        })
        .collect()
}

/// Numerically stable in-place softmax over one score row.
pub(crate) fn softmax_inplace(scores: &mut [f64]) {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    if sum > 0.0 {
        for s in scores.iter_mut() {
            *s /= sum;
        }
    }
}
