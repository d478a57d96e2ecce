//! prognos: a multi-model diagnosis prediction pipeline.
//!
//! Trains several classifier variants on preprocessed patient records,
//! selects the best by held-out accuracy, and serves ranked probabilistic
//! predictions by replaying the exact fit-time transforms on new records.
//!
//! # Key Types
//!
//! - [`DiagnosisModel`] - High-level facade with train/predict/explain
//! - [`PipelineConfig`] - Training configuration builder
//! - [`DataTable`] / [`Record`] - Training and inference inputs
//! - [`TrainingReport`] / [`Prediction`] / [`Explanation`] - Outputs
//!
//! # Training
//!
//! Build a [`DataTable`] with a categorical `diagnosis` column, then call
//! [`DiagnosisModel::train`]. The returned report names the winning
//! variant and carries the full per-variant performance table.
//!
//! # Inference
//!
//! [`DiagnosisModel::predict`] replays the fitted transforms on a
//! [`Record`] and returns at most `top_k` predictions, most confident
//! first. [`DiagnosisModel::explain`] adds the winning model's strongest
//! feature importances.

pub mod data;
pub mod explainability;
pub mod inference;
pub mod model;
pub mod persist;
pub mod pipeline;
pub mod preprocess;
pub mod testing;
pub mod training;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level facade and configuration
pub use pipeline::{
    ConfigError, DiagnosisModel, PipelineConfig, TrainedPipeline, TrainingReport,
    VariantPerformance,
};

// Inputs
pub use data::{DataTable, DataTableBuilder, Record, Value};

// Outputs
pub use explainability::Explanation;
pub use inference::{PredictError, Prediction};

// Errors
pub use persist::PersistError;
pub use training::TrainingError;
