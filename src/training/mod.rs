//! Multi-model training: shared splits, metrics, the model bank, and
//! winner selection.

mod bank;
mod metrics;
mod selector;
mod split;

pub use bank::{ModelBank, ModelRecord, VariantFailure};
pub use metrics::{
    accuracy, classification_report, mean_std, ClassMetrics, ClassificationReport, ReportAverages,
};
pub use selector::{select_best, SelectionResult};
pub use split::{k_fold_indices, stratified_split, TrainTestSplit};

use crate::preprocess::PreprocessError;

/// Errors that abort a whole training run.
///
/// Per-variant fit failures are deliberately absent: they are isolated,
/// logged, and reported through [`ModelBank::failures`].
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error("dataset has {n_samples} rows; at least 2 are required")]
    DatasetTooSmall { n_samples: usize },

    #[error("no variant trained successfully")]
    NoTrainedModel,

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
}
