//! The model bank: a fixed roster of classifier variants trained on one
//! shared split.
//!
//! Every variant sees the identical stratified split and the identical
//! cross-validation folds. A variant that fails to fit is logged and
//! recorded, never fatal to the run.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::model::{
    FittedVariant, GradientBoostConfig, LogisticConfig, ModelFn, RandomForestConfig, Variant,
};

use super::metrics::{accuracy, classification_report, mean_std, ClassificationReport};
use super::split::{k_fold_indices, stratified_split};
use super::TrainingError;

/// Performance record of one successfully trained variant.
///
/// Created during training, immutable afterwards; the bank retains every
/// record, not just the winner's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Roster identifier of the variant.
    pub name: String,
    /// The fitted model.
    pub model: FittedVariant,
    /// Held-out accuracy on the shared test partition.
    pub accuracy: f64,
    /// Cross-validated accuracy mean over the training partition.
    pub cv_mean: f64,
    /// Cross-validated accuracy standard deviation.
    pub cv_std: f64,
    /// Full per-class report on the held-out partition.
    pub report: ClassificationReport,
    /// Importance weights keyed by feature name in frozen column order,
    /// when the variant exposes them.
    pub importances: Option<Vec<(String, f64)>>,
}

/// A variant that failed to fit, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantFailure {
    pub name: String,
    pub reason: String,
}

/// All training results: one [`ModelRecord`] per surviving variant plus
/// the isolated failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBank {
    records: Vec<ModelRecord>,
    failures: Vec<VariantFailure>,
}

/// Copy the given rows out of a sample-major matrix.
fn select_rows(features: ArrayView2<f64>, indices: &[usize]) -> Array2<f64> {
    let mut out = Array2::zeros((indices.len(), features.ncols()));
    for (r, &i) in indices.iter().enumerate() {
        out.row_mut(r).assign(&features.row(i));
    }
    out
}

fn select_labels(labels: &[usize], indices: &[usize]) -> Vec<usize> {
    indices.iter().map(|&i| labels[i]).collect()
}

impl ModelBank {
    /// The standard three-variant roster, in selection order.
    pub fn standard_roster() -> Vec<(String, Variant)> {
        vec![
            (
                "random_forest".to_string(),
                Variant::RandomForest(RandomForestConfig::default()),
            ),
            (
                "gradient_boost".to_string(),
                Variant::GradientBoost(GradientBoostConfig::default()),
            ),
            (
                "logistic_regression".to_string(),
                Variant::Logistic(LogisticConfig::default()),
            ),
        ]
    }

    /// Train every roster variant on one shared stratified split.
    ///
    /// `features` is the preprocessed matrix `[n_samples, n_features]`;
    /// `class_names` and `feature_names` are the frozen vocabularies used
    /// to key reports and importances. Cross-validation runs on the
    /// training partition only, with folds shared across variants and
    /// evaluated in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError::DatasetTooSmall`] for fewer than two
    /// rows. Per-variant fit failures are recorded, not returned.
    #[allow(clippy::too_many_arguments)]
    pub fn train_all(
        roster: &[(String, Variant)],
        features: ArrayView2<f64>,
        labels: &[usize],
        n_classes: usize,
        class_names: &[String],
        feature_names: &[String],
        test_fraction: f64,
        cv_folds: usize,
        seed: u64,
    ) -> Result<ModelBank, TrainingError> {
        let n_samples = features.nrows();
        if n_samples < 2 {
            return Err(TrainingError::DatasetTooSmall { n_samples });
        }

        let split = stratified_split(labels, n_classes, test_fraction, seed);
        let x_train = select_rows(features, &split.train);
        let y_train = select_labels(labels, &split.train);
        let x_test = select_rows(features, &split.test);
        let y_test = select_labels(labels, &split.test);

        // Fold assignments are positions into the training partition,
        // generated once so every variant sees identical folds.
        let folds = k_fold_indices(split.train.len(), cv_folds, seed);

        let mut records = Vec::new();
        let mut failures = Vec::new();

        for (name, variant) in roster {
            let fitted = match variant.fit(x_train.view(), &y_train, n_classes, seed) {
                Ok(fitted) => fitted,
                Err(err) => {
                    log::warn!("variant '{}' failed to fit: {}", name, err);
                    failures.push(VariantFailure {
                        name: name.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let predictions = fitted.predict(x_test.view());
            let held_out_accuracy = accuracy(&predictions, &y_test);
            let report = classification_report(&predictions, &y_test, class_names);

            let cv_scores: Vec<f64> = folds
                .par_iter()
                .filter_map(|held_out| {
                    let fit_positions: Vec<usize> =
                        (0..split.train.len()).filter(|i| !held_out.contains(i)).collect();
                    let x_fit = select_rows(x_train.view(), &fit_positions);
                    let y_fit = select_labels(&y_train, &fit_positions);
                    let x_held = select_rows(x_train.view(), held_out);
                    let y_held = select_labels(&y_train, held_out);

                    let fold_model = variant.fit(x_fit.view(), &y_fit, n_classes, seed).ok()?;
                    let fold_predictions = fold_model.predict(x_held.view());
                    Some(accuracy(&fold_predictions, &y_held))
                })
                .collect();
            let (cv_mean, cv_std) = mean_std(&cv_scores);

            let importances = fitted.feature_importances().map(|weights| {
                feature_names
                    .iter()
                    .cloned()
                    .zip(weights)
                    .collect::<Vec<_>>()
            });

            log::debug!(
                "variant '{}': accuracy {:.4}, cv {:.4} ± {:.4}",
                name,
                held_out_accuracy,
                cv_mean,
                cv_std
            );

            records.push(ModelRecord {
                name: name.clone(),
                model: fitted,
                accuracy: held_out_accuracy,
                cv_mean,
                cv_std,
                report,
                importances,
            });
        }

        Ok(ModelBank { records, failures })
    }

    /// Records of every variant that trained, in roster order.
    pub fn records(&self) -> &[ModelRecord] {
        &self.records
    }

    /// Look up a record by variant name.
    pub fn record(&self, name: &str) -> Option<&ModelRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Variants that failed to fit.
    pub fn failures(&self) -> &[VariantFailure] {
        &self.failures
    }

    /// Returns true if no variant trained successfully.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn records_mut(&mut self) -> &mut [ModelRecord] {
        &mut self.records
    }
}
