//! Deterministic data generators shared by unit and integration tests.

use ndarray::Array2;
use rand::prelude::*;

use crate::data::{DataTable, Record};

const GENERATOR_SEED: u64 = 42;

/// The five-row clinic sample: demographics, vitals, symptoms, and one
/// diagnosis per row.
pub fn sample_clinic_table() -> DataTable {
    let cat = |values: &[&str]| -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    };

    DataTable::builder()
        .numeric("age", vec![45.0, 32.0, 67.0, 28.0, 55.0])
        .categorical("gender", cat(&["M", "F", "M", "F", "M"]))
        .categorical(
            "symptoms",
            cat(&["fever,cough", "headache", "chest_pain", "fever", "fatigue"]),
        )
        .categorical(
            "blood_pressure",
            cat(&["140/90", "120/80", "160/100", "130/85", "150/95"]),
        )
        .numeric("heart_rate", vec![90.0, 75.0, 110.0, 85.0, 95.0])
        .numeric("temperature", vec![38.5, 37.0, 37.2, 38.0, 36.8])
        .categorical(
            "diagnosis",
            cat(&["flu", "migraine", "hypertension", "viral_infection", "diabetes"]),
        )
        .build()
        .expect("sample table is well-formed")
}

/// A new patient for the clinic sample.
///
/// Deliberately omits the `symptoms` feature; inference substitutes `0`
/// for it. Every categorical value present was seen at fit time.
pub fn clinic_patient() -> Record {
    Record::new()
        .with_number("age", 40.0)
        .with_text("gender", "M")
        .with_text("blood_pressure", "140/90")
        .with_number("heart_rate", 88.0)
        .with_number("temperature", 38.2)
}

/// A learnable synthetic clinic table with three diagnosis classes.
///
/// Vitals are drawn around class-dependent centers with seeded uniform
/// jitter, so repeated calls return identical tables.
pub fn synthetic_table(n_rows: usize) -> DataTable {
    let mut rng = StdRng::seed_from_u64(GENERATOR_SEED);
    let diagnoses = ["flu", "hypertension", "diabetes"];
    let age_center = [30.0, 55.0, 70.0];
    let rate_center = [70.0, 95.0, 82.0];
    let temp_center = [38.3, 36.8, 37.2];

    let mut age = Vec::with_capacity(n_rows);
    let mut gender = Vec::with_capacity(n_rows);
    let mut heart_rate = Vec::with_capacity(n_rows);
    let mut temperature = Vec::with_capacity(n_rows);
    let mut diagnosis = Vec::with_capacity(n_rows);

    for i in 0..n_rows {
        let class = i % diagnoses.len();
        age.push(age_center[class] + rng.gen::<f64>() * 8.0 - 4.0);
        heart_rate.push(rate_center[class] + rng.gen::<f64>() * 6.0 - 3.0);
        temperature.push(temp_center[class] + rng.gen::<f64>() * 0.4 - 0.2);
        gender.push(Some(if i % 2 == 0 { "M" } else { "F" }.to_string()));
        diagnosis.push(Some(diagnoses[class].to_string()));
    }

    DataTable::builder()
        .numeric("age", age)
        .categorical("gender", gender)
        .numeric("heart_rate", heart_rate)
        .numeric("temperature", temperature)
        .categorical("diagnosis", diagnosis)
        .build()
        .expect("synthetic table is well-formed")
}

/// A preprocessed synthetic problem for exercising trainers directly.
///
/// Returns `(features, labels, class_names, feature_names)`: a
/// `[n_rows, 4]` matrix with class-dependent feature centers, labels in
/// `0..n_classes`, and the vocabularies used to key reports.
pub fn synthetic_features(
    n_rows: usize,
    n_classes: usize,
) -> (Array2<f64>, Vec<usize>, Vec<String>, Vec<String>) {
    let n_features = 4;
    let mut rng = StdRng::seed_from_u64(GENERATOR_SEED);

    let mut features = Array2::zeros((n_rows, n_features));
    let mut labels = Vec::with_capacity(n_rows);
    for i in 0..n_rows {
        let class = i % n_classes.max(1);
        for j in 0..n_features {
            let center = (class * (j + 1)) as f64;
            features[[i, j]] = center + rng.gen::<f64>() - 0.5;
        }
        labels.push(class);
    }

    let class_names = (0..n_classes).map(|k| format!("class_{}", k)).collect();
    let feature_names = (0..n_features).map(|j| format!("f{}", j)).collect();
    (features, labels, class_names, feature_names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_table_shape() {
        let table = sample_clinic_table();
        assert_eq!(table.n_rows(), 5);
        assert_eq!(table.n_columns(), 7);
        assert!(table.has_column("diagnosis"));
    }

    #[test]
    fn clinic_patient_omits_symptoms() {
        let patient = clinic_patient();
        assert!(patient.get("symptoms").is_none());
        assert!(patient.get("age").is_some());
    }

    #[test]
    fn synthetic_table_is_deterministic() {
        let a = synthetic_table(12);
        let b = synthetic_table(12);
        let col = |t: &DataTable| match t.column("age").unwrap().data() {
            crate::data::ColumnData::Numeric(v) => v.clone(),
            _ => unreachable!(),
        };
        assert_eq!(col(&a), col(&b));
    }

    #[test]
    fn synthetic_features_shape() {
        let (features, labels, class_names, feature_names) = synthetic_features(9, 3);
        assert_eq!(features.dim(), (9, 4));
        assert_eq!(labels.len(), 9);
        assert_eq!(class_names.len(), 3);
        assert_eq!(feature_names.len(), 4);
        assert!(labels.iter().all(|&l| l < 3));
    }
}
