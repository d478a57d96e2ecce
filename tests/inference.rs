//! Ranked prediction and explanation over the frozen serving state.

use approx::assert_abs_diff_eq;
use prognos::data::Record;
use prognos::pipeline::DiagnosisModel;
use prognos::testing::{clinic_patient, sample_clinic_table, synthetic_table};

fn trained_on_synthetic() -> DiagnosisModel {
    let mut model = DiagnosisModel::new();
    model.train(&synthetic_table(60)).unwrap();
    model
}

fn synthetic_patient() -> Record {
    Record::new()
        .with_number("age", 31.0)
        .with_text("gender", "F")
        .with_number("heart_rate", 71.0)
        .with_number("temperature", 38.2)
}

#[test]
fn top_3_is_ranked_and_in_range() {
    let model = trained_on_synthetic();
    let predictions = model.predict(&synthetic_patient(), 3).unwrap();

    assert_eq!(predictions.len(), 3);
    for pair in predictions.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    let mut total = 0.0;
    for p in &predictions {
        assert!((0.0..=1.0).contains(&p.confidence));
        assert!((0.0..=1.0).contains(&p.probability));
        assert_abs_diff_eq!(p.confidence, p.probability);
        total += p.probability;
    }
    assert!(total <= 1.0 + 1e-9);
}

#[test]
fn top_k_clamps_to_class_count() {
    let model = trained_on_synthetic();
    let predictions = model.predict(&synthetic_patient(), 10).unwrap();
    // Three diagnosis classes exist, so at most three predictions.
    assert_eq!(predictions.len(), 3);
}

#[test]
fn predictions_rank_the_plausible_diagnosis_first() {
    let model = trained_on_synthetic();
    // Young, low heart rate, feverish: the flu-centered cluster.
    let predictions = model.predict(&synthetic_patient(), 1).unwrap();
    assert_eq!(predictions[0].diagnosis, "flu");
}

#[test]
fn record_missing_a_feature_still_predicts() {
    let mut model = DiagnosisModel::new();
    model.train(&sample_clinic_table()).unwrap();

    let patient = clinic_patient();
    assert!(patient.get("symptoms").is_none());

    let predictions = model.predict(&patient, 3).unwrap();
    assert!(!predictions.is_empty());
    assert!(predictions.len() <= 3);
    for p in &predictions {
        assert!((0.0..=1.0).contains(&p.confidence));
    }
}

#[test]
fn prediction_labels_come_from_the_fitted_vocabulary() {
    let mut model = DiagnosisModel::new();
    model.train(&sample_clinic_table()).unwrap();

    let vocabulary = ["flu", "migraine", "hypertension", "viral_infection", "diabetes"];
    for p in model.predict(&clinic_patient(), 5).unwrap() {
        assert!(vocabulary.contains(&p.diagnosis.as_str()));
    }
}

#[test]
fn explanation_composes_prediction_and_importance() {
    let model = trained_on_synthetic();
    let explanation = model.explain(&synthetic_patient()).unwrap();

    let top1 = model.predict(&synthetic_patient(), 1).unwrap();
    assert_eq!(explanation.prediction, top1[0]);

    assert!(explanation.key_factors.len() <= 5);
    assert!(explanation.key_factors.len() <= explanation.feature_importance.len());
    for pair in explanation.key_factors.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
}

#[test]
fn importance_capable_winner_keys_by_frozen_order() {
    use prognos::model::{RandomForestConfig, Variant};
    use prognos::pipeline::PipelineConfig;

    let roster = vec![(
        "random_forest".to_string(),
        Variant::RandomForest(RandomForestConfig::default()),
    )];
    let mut model = DiagnosisModel::with_roster(PipelineConfig::default(), roster);
    model.train(&synthetic_table(60)).unwrap();

    let explanation = model.explain(&synthetic_patient()).unwrap();
    let feature_names: Vec<_> = explanation
        .feature_importance
        .iter()
        .map(|(n, _)| n.as_str())
        .collect();
    assert_eq!(feature_names, vec!["age", "gender", "heart_rate", "temperature"]);
    assert!(!explanation.key_factors.is_empty());
}

#[test]
fn importance_free_winner_yields_empty_mapping() {
    use prognos::model::{LogisticConfig, Variant};
    use prognos::pipeline::PipelineConfig;

    let roster = vec![(
        "logistic_regression".to_string(),
        Variant::Logistic(LogisticConfig::default()),
    )];
    let mut model = DiagnosisModel::with_roster(PipelineConfig::default(), roster);
    model.train(&synthetic_table(60)).unwrap();

    let explanation = model.explain(&synthetic_patient()).unwrap();
    assert!(explanation.feature_importance.is_empty());
    assert!(explanation.key_factors.is_empty());
}

#[test]
fn shared_state_serves_concurrent_predictions() {
    use std::sync::Arc;

    let model = Arc::new(trained_on_synthetic());
    let baseline = model.predict(&synthetic_patient(), 3).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = Arc::clone(&model);
            std::thread::spawn(move || model.predict(&synthetic_patient(), 3).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), baseline);
    }
}
