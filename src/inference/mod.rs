//! Single-record inference: transform replay plus ranked predictions.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::model::ModelFn;
use crate::preprocess::{FittedTransformSet, PreprocessError};

/// One ranked diagnosis prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Decoded diagnosis label.
    pub diagnosis: String,
    /// Confidence in `[0, 1]`; equals the class probability when the
    /// winning model exposes probabilities.
    pub confidence: f64,
    /// Class probability in `[0, 1]`.
    pub probability: f64,
}

/// Errors raised during inference or explanation.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("no trained model available; run training first")]
    ModelNotTrained,

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
}

/// Rank classes for one transformed record and emit at most `top_k`
/// predictions.
///
/// A probability-capable model yields all classes ranked by descending
/// probability (ties broken toward the lower class code); a model
/// without probabilities yields a single point estimate with confidence
/// and probability pinned to `1.0`.
pub(crate) fn predict_top_k<M: ModelFn>(
    model: &M,
    transforms: &FittedTransformSet,
    vector: Array1<f64>,
    top_k: usize,
) -> Vec<Prediction> {
    let n = vector.len();
    let features = vector.into_shape_with_order((1, n)).expect("1-row reshape");

    let decode = |code: usize| -> String {
        transforms
            .label_encoder()
            .decode(code)
            .expect("class codes come from the fitted vocabulary")
            .to_string()
    };

    match model.predict_probability(features.view()) {
        Some(probabilities) => {
            let row = probabilities.row(0);
            let mut ranked: Vec<(usize, f64)> =
                row.iter().copied().enumerate().collect();
            ranked.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });

            ranked
                .into_iter()
                .take(top_k)
                .map(|(code, probability)| Prediction {
                    diagnosis: decode(code),
                    confidence: probability,
                    probability,
                })
                .collect()
        }
        None => {
            let code = model.predict(features.view())[0];
            vec![Prediction {
                diagnosis: decode(code),
                confidence: 1.0,
                probability: 1.0,
            }]
        }
    }
}
