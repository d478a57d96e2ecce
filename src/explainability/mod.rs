//! Prediction explanations from feature importance.
//!
//! An [`Explanation`] pairs the top-1 prediction with the winning
//! model's importance mapping and the strongest key factors.

use serde::{Deserialize, Serialize};

use crate::inference::Prediction;

/// Number of key factors reported per explanation.
pub const KEY_FACTOR_COUNT: usize = 5;

/// A human-readable explanation of one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// The top-1 prediction for the record.
    pub prediction: Prediction,
    /// The full importance mapping of the winning model, keyed by feature
    /// name in frozen column order. Empty when the model exposes none.
    pub feature_importance: Vec<(String, f64)>,
    /// The strongest importances, descending, at most
    /// [`KEY_FACTOR_COUNT`] entries.
    pub key_factors: Vec<(String, f64)>,
}

/// Rank importances descending and keep the strongest `k`.
///
/// Equal weights are ordered by feature name so the ranking is
/// deterministic.
pub fn key_factors(importance: &[(String, f64)], k: usize) -> Vec<(String, f64)> {
    let mut ranked = importance.to_vec();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(k);
    ranked
}
