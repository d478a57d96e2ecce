//! Persistence: versioned payloads for the frozen serving state.
//!
//! The payload is a version-tagged enum so future format revisions add
//! variants instead of mutating existing ones; older readers detect
//! unsupported versions from the tag. Loading restores prediction
//! behavior equivalent to the state at save time.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::Variant;
use crate::pipeline::{DiagnosisModel, PipelineConfig, TrainedPipeline};

/// Errors raised while saving or loading a model.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("model has not been trained; nothing to save")]
    NotTrained,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("payload error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Version-tagged payload.
#[derive(Debug, Serialize, Deserialize)]
enum Payload {
    /// Version 1 payload format.
    V1(PayloadV1),
}

/// Version 1 payload: configuration, roster, and the complete frozen
/// pipeline state.
#[derive(Debug, Serialize, Deserialize)]
struct PayloadV1 {
    config: PipelineConfig,
    roster: Vec<(String, Variant)>,
    pipeline: TrainedPipeline,
}

impl DiagnosisModel {
    /// Save the trained model to a file.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::NotTrained`] if no training run has
    /// completed; I/O and serialization errors propagate.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let (config, roster, state) = self.parts();
        let pipeline = state.ok_or(PersistError::NotTrained)?;

        let payload = Payload::V1(PayloadV1 {
            config: config.clone(),
            roster: roster.to_vec(),
            pipeline: pipeline.clone(),
        });

        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), &payload)?;
        Ok(())
    }

    /// Load a trained model from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let file = File::open(path)?;
        let payload: Payload = serde_json::from_reader(BufReader::new(file))?;

        let Payload::V1(payload) = payload;
        Ok(DiagnosisModel::from_parts(
            payload.config,
            payload.roster,
            payload.pipeline,
        ))
    }
}
