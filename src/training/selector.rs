//! Winner selection over the trained bank.

use serde::{Deserialize, Serialize};

use super::bank::ModelBank;
use super::TrainingError;

/// The outcome of model selection for one training run.
///
/// Holds an index into the bank's record list rather than a copy of the
/// model; the bank stays the single owner of every fitted variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Index of the winning record in the bank.
    pub best_index: usize,
    /// Roster identifier of the winner.
    pub best_name: String,
    /// The winner's held-out accuracy.
    pub best_accuracy: f64,
}

/// Pick the variant with the strictly highest held-out accuracy.
///
/// Records are scanned in roster order with a strictly-greater
/// comparison, so the first-encountered variant wins exact ties.
///
/// # Errors
///
/// Returns [`TrainingError::NoTrainedModel`] if every variant failed to
/// fit.
pub fn select_best(bank: &ModelBank) -> Result<SelectionResult, TrainingError> {
    let mut best: Option<(usize, f64)> = None;
    for (index, record) in bank.records().iter().enumerate() {
        if best.map_or(true, |(_, acc)| record.accuracy > acc) {
            best = Some((index, record.accuracy));
        }
    }

    let (best_index, best_accuracy) = best.ok_or(TrainingError::NoTrainedModel)?;
    Ok(SelectionResult {
        best_index,
        best_name: bank.records()[best_index].name.clone(),
        best_accuracy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LogisticConfig, RandomForestConfig, Variant};
    use crate::testing::synthetic_features;
    use crate::training::bank::ModelBank;
    use crate::training::metrics::classification_report;

    fn bank_with_accuracies(accuracies: &[f64]) -> ModelBank {
        // Train a real single-variant bank, then rewrite the accuracy
        // fields to the requested values.
        let (features, labels, class_names, feature_names) = synthetic_features(20, 2);
        let roster: Vec<_> = accuracies
            .iter()
            .enumerate()
            .map(|(i, _)| {
                (
                    format!("variant_{}", i),
                    Variant::Logistic(LogisticConfig::default()),
                )
            })
            .collect();
        let mut bank = ModelBank::train_all(
            &roster,
            features.view(),
            &labels,
            2,
            &class_names,
            &feature_names,
            0.25,
            2,
            42,
        )
        .unwrap();
        for (record, &accuracy) in bank.records_mut().iter_mut().zip(accuracies) {
            record.accuracy = accuracy;
        }
        bank
    }

    #[test]
    fn picks_strictly_highest() {
        let bank = bank_with_accuracies(&[0.4, 0.9, 0.7]);
        let selection = select_best(&bank).unwrap();
        assert_eq!(selection.best_index, 1);
        assert_eq!(selection.best_name, "variant_1");
        assert_eq!(selection.best_accuracy, 0.9);
    }

    #[test]
    fn first_encountered_wins_ties() {
        let bank = bank_with_accuracies(&[0.8, 0.8, 0.8]);
        let selection = select_best(&bank).unwrap();
        assert_eq!(selection.best_index, 0);
        assert_eq!(selection.best_name, "variant_0");
    }

    #[test]
    fn empty_bank_is_no_trained_model() {
        let (features, labels, class_names, feature_names) = synthetic_features(20, 2);
        let roster = vec![(
            "broken".to_string(),
            Variant::RandomForest(RandomForestConfig {
                n_trees: 0,
                ..Default::default()
            }),
        )];
        let bank = ModelBank::train_all(
            &roster,
            features.view(),
            &labels,
            2,
            &class_names,
            &feature_names,
            0.25,
            2,
            42,
        )
        .unwrap();

        assert!(bank.is_empty());
        assert!(matches!(
            select_best(&bank),
            Err(TrainingError::NoTrainedModel)
        ));
    }

    #[test]
    fn classification_report_is_usable_in_records() {
        let names = vec!["a".to_string(), "b".to_string()];
        let report = classification_report(&[0, 1], &[0, 1], &names);
        assert_eq!(report.accuracy, 1.0);
    }
}
