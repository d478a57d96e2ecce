//! The end-to-end pipeline: configuration, the frozen serving state, and
//! the [`DiagnosisModel`] facade.
//!
//! Training produces a [`TrainedPipeline`] exactly once per run; it is an
//! explicit immutable value threaded into every inference and explanation
//! call. There is no hidden shared state.

use serde::{Deserialize, Serialize};

use crate::data::{DataTable, Record};
use crate::explainability::{key_factors, Explanation, KEY_FACTOR_COUNT};
use crate::inference::{predict_top_k, PredictError, Prediction};
use crate::model::{FittedVariant, Variant};
use crate::preprocess::FittedTransformSet;
use crate::training::{
    select_best, ClassificationReport, ModelBank, SelectionResult, TrainingError, VariantFailure,
};

// =============================================================================
// Configuration
// =============================================================================

/// Invalid pipeline configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("test_fraction must be in (0, 1), got {0}")]
    InvalidTestFraction(f64),

    #[error("cv_folds must be at least 2, got {0}")]
    InvalidCvFolds(usize),
}

/// Training configuration.
///
/// Use [`PipelineConfig::builder`] for validated construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the split, the folds, and variant-internal randomness.
    pub seed: u64,
    /// Number of cross-validation folds.
    pub cv_folds: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            cv_folds: 5,
        }
    }
}

impl PipelineConfig {
    /// Create a builder with default values.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the held-out fraction.
    pub fn test_fraction(mut self, fraction: f64) -> Self {
        self.config.test_fraction = fraction;
        self
    }

    /// Set the seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the number of cross-validation folds.
    pub fn cv_folds(mut self, folds: usize) -> Self {
        self.config.cv_folds = folds;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let config = self.config;
        if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
            return Err(ConfigError::InvalidTestFraction(config.test_fraction));
        }
        if config.cv_folds < 2 {
            return Err(ConfigError::InvalidCvFolds(config.cv_folds));
        }
        Ok(config)
    }
}

// =============================================================================
// Frozen serving state
// =============================================================================

/// The frozen state of one completed training run.
///
/// Immutable and `Send + Sync`: safe to share read-only across parallel
/// inference calls. The transform set owns all fitted transforms; the
/// bank owns every fitted model; the selection holds only an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedPipeline {
    transforms: FittedTransformSet,
    bank: ModelBank,
    selection: SelectionResult,
}

impl TrainedPipeline {
    /// The fitted transform set.
    pub fn transforms(&self) -> &FittedTransformSet {
        &self.transforms
    }

    /// The trained model bank.
    pub fn bank(&self) -> &ModelBank {
        &self.bank
    }

    /// The selection outcome.
    pub fn selection(&self) -> &SelectionResult {
        &self.selection
    }

    /// The winning fitted model.
    pub fn best_model(&self) -> &FittedVariant {
        &self.bank.records()[self.selection.best_index].model
    }

    /// Predict ranked diagnoses for one record.
    ///
    /// Replays the fitted transforms, then ranks classes with whatever
    /// scoring capability the winning model exposes. At most `top_k`
    /// predictions are returned, most confident first.
    pub fn predict(
        &self,
        record: &Record,
        top_k: usize,
    ) -> Result<Vec<Prediction>, PredictError> {
        let vector = self.transforms.transform(record)?;
        Ok(predict_top_k(self.best_model(), &self.transforms, vector, top_k))
    }

    /// Explain the top-1 prediction for one record.
    pub fn explain(&self, record: &Record) -> Result<Explanation, PredictError> {
        let mut predictions = self.predict(record, 1)?;
        let prediction = predictions.remove(0);

        let feature_importance = self.bank.records()[self.selection.best_index]
            .importances
            .clone()
            .unwrap_or_default();

        Ok(Explanation {
            prediction,
            key_factors: key_factors(&feature_importance, KEY_FACTOR_COUNT),
            feature_importance,
        })
    }
}

// =============================================================================
// Training report
// =============================================================================

/// Per-variant metrics in the training report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantPerformance {
    pub accuracy: f64,
    pub cv_mean: f64,
    pub cv_std: f64,
    pub report: ClassificationReport,
}

/// The user-visible outcome of one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Roster identifier of the winning variant.
    pub best_model: String,
    /// The winner's held-out accuracy.
    pub best_accuracy: f64,
    /// Performance of every surviving variant, in roster order.
    pub performance: Vec<(String, VariantPerformance)>,
    /// Variants that failed to fit.
    pub failures: Vec<VariantFailure>,
}

impl TrainingReport {
    fn new(bank: &ModelBank, selection: &SelectionResult) -> Self {
        let performance = bank
            .records()
            .iter()
            .map(|record| {
                (
                    record.name.clone(),
                    VariantPerformance {
                        accuracy: record.accuracy,
                        cv_mean: record.cv_mean,
                        cv_std: record.cv_std,
                        report: record.report.clone(),
                    },
                )
            })
            .collect();

        Self {
            best_model: selection.best_name.clone(),
            best_accuracy: selection.best_accuracy,
            performance,
            failures: bank.failures().to_vec(),
        }
    }
}

// =============================================================================
// Facade
// =============================================================================

/// The diagnosis prediction model: train on a table, predict and explain
/// single records.
///
/// # Example
///
/// ```no_run
/// use prognos::data::{DataTable, Record};
/// use prognos::pipeline::DiagnosisModel;
///
/// # fn demo(table: DataTable) -> Result<(), Box<dyn std::error::Error>> {
/// let mut model = DiagnosisModel::new();
/// let report = model.train(&table)?;
/// println!("best: {} ({:.3})", report.best_model, report.best_accuracy);
///
/// let patient = Record::new().with_number("age", 40.0).with_text("gender", "M");
/// for p in model.predict(&patient, 3)? {
///     println!("{}: {:.3}", p.diagnosis, p.confidence);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosisModel {
    config: PipelineConfig,
    roster: Vec<(String, Variant)>,
    state: Option<TrainedPipeline>,
}

impl Default for DiagnosisModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagnosisModel {
    /// Create a model with the default configuration and the standard
    /// three-variant roster.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a model with a custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        Self::with_roster(config, ModelBank::standard_roster())
    }

    /// Create a model with a custom roster.
    ///
    /// Roster order matters: the selector resolves accuracy ties toward
    /// the first-encountered variant.
    pub fn with_roster(config: PipelineConfig, roster: Vec<(String, Variant)>) -> Self {
        Self {
            config,
            roster,
            state: None,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The frozen state of the last completed training run, if any.
    pub fn trained(&self) -> Option<&TrainedPipeline> {
        self.state.as_ref()
    }

    /// Returns true once a training run has completed successfully.
    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Train every roster variant and freeze the winning state.
    ///
    /// Fits all transforms, trains the bank on one shared stratified
    /// split, selects the winner, and replaces any previous state.
    ///
    /// # Errors
    ///
    /// Transform and schema errors abort the run; so does a roster where
    /// every variant failed. Isolated per-variant failures are reported
    /// in the returned [`TrainingReport`].
    pub fn train(&mut self, table: &DataTable) -> Result<TrainingReport, TrainingError> {
        let (transforms, features, labels) = FittedTransformSet::fit(table)?;
        let class_names = transforms.label_encoder().vocabulary().to_vec();
        let feature_names = transforms.feature_names();

        let bank = ModelBank::train_all(
            &self.roster,
            features.view(),
            &labels,
            transforms.n_classes(),
            &class_names,
            &feature_names,
            self.config.test_fraction,
            self.config.cv_folds,
            self.config.seed,
        )?;
        let selection = select_best(&bank)?;
        let report = TrainingReport::new(&bank, &selection);

        self.state = Some(TrainedPipeline {
            transforms,
            bank,
            selection,
        });
        Ok(report)
    }

    /// Predict ranked diagnoses for one record.
    ///
    /// # Errors
    ///
    /// Fails with [`PredictError::ModelNotTrained`] before the first
    /// successful [`train`](Self::train) call; transform errors propagate.
    pub fn predict(
        &self,
        record: &Record,
        top_k: usize,
    ) -> Result<Vec<Prediction>, PredictError> {
        self.state
            .as_ref()
            .ok_or(PredictError::ModelNotTrained)?
            .predict(record, top_k)
    }

    /// Explain the top-1 prediction for one record.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`predict`](Self::predict).
    pub fn explain(&self, record: &Record) -> Result<Explanation, PredictError> {
        self.state
            .as_ref()
            .ok_or(PredictError::ModelNotTrained)?
            .explain(record)
    }

    pub(crate) fn parts(
        &self,
    ) -> (&PipelineConfig, &[(String, Variant)], Option<&TrainedPipeline>) {
        (&self.config, &self.roster, self.state.as_ref())
    }

    pub(crate) fn from_parts(
        config: PipelineConfig,
        roster: Vec<(String, Variant)>,
        state: TrainedPipeline,
    ) -> Self {
        Self {
            config,
            roster,
            state: Some(state),
        }
    }
}
