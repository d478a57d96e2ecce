//! Stateful, fit-once-apply-many preprocessing transforms.
//!
//! Training fits every transform exactly once ([`FittedTransformSet::fit`]);
//! inference replays the fitted state unchanged
//! ([`FittedTransformSet::transform`]). Any divergence between the two
//! paths silently corrupts predictions, so both run through the same
//! fitted objects and the same frozen column order.

mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use encoder::{CategoryEncoder, MISSING_SENTINEL};
pub use imputer::MedianImputer;
pub use pipeline::{FeatureTransform, FittedTransformSet};
pub use scaler::StandardScaler;

/// Errors raised while fitting or replaying transforms.
///
/// All of these indicate an unrecoverable data contract violation and
/// abort the operation (training or inference) they occur in.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("column '{column}' has no usable values to fit a transform")]
    EmptyColumn { column: String },

    #[error("unknown category '{value}' in column '{column}'")]
    UnknownCategory { column: String, value: String },

    #[error("schema mismatch for '{column}': expected {expected}, got {got}")]
    SchemaMismatch {
        column: String,
        expected: String,
        got: String,
    },

    #[error("missing mandatory label column '{0}'")]
    MissingLabelColumn(String),
}
