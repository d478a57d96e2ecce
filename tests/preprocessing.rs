//! Transform/replay contract: fitting on a table and replaying on
//! records must agree exactly.

use approx::assert_abs_diff_eq;
use prognos::data::{DataTable, Record};
use prognos::preprocess::{CategoryEncoder, FittedTransformSet, PreprocessError};

fn cat(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

fn complete_table() -> DataTable {
    DataTable::builder()
        .numeric("age", vec![45.0, 32.0, 67.0, 28.0, 55.0])
        .categorical("gender", cat(&["M", "F", "M", "F", "M"]))
        .categorical("symptoms", cat(&["fever", "headache", "chest_pain", "fever", "fatigue"]))
        .numeric("heart_rate", vec![90.0, 75.0, 110.0, 85.0, 95.0])
        .categorical(
            "diagnosis",
            cat(&["flu", "migraine", "hypertension", "viral_infection", "diabetes"]),
        )
        .build()
        .unwrap()
}

fn record_for_row(table: &DataTable, row: usize) -> Record {
    let mut record = Record::new();
    for column in table.columns() {
        if column.name() == "diagnosis" {
            continue;
        }
        match column.data() {
            prognos::data::ColumnData::Numeric(values) => {
                record = record.with_number(column.name(), values[row]);
            }
            prognos::data::ColumnData::Categorical(values) => {
                record = record.with_text(column.name(), values[row].as_deref().unwrap());
            }
        }
    }
    record
}

#[test]
fn roundtrip_reproduces_training_vectors() {
    let table = complete_table();
    let (set, features, _) = FittedTransformSet::fit(&table).unwrap();

    for row in 0..table.n_rows() {
        let vector = set.transform(&record_for_row(&table, row)).unwrap();
        for j in 0..set.n_features() {
            assert_abs_diff_eq!(vector[j], features[[row, j]], epsilon = 1e-12);
        }
    }
}

#[test]
fn encoders_are_bijections() {
    let values = cat(&["fever", "headache", "fever", "chest_pain", "fatigue"]);
    let encoder = CategoryEncoder::fit("symptoms", &values);

    // Codes cover exactly {0, …, |vocab|-1} in first-seen order.
    assert_eq!(encoder.n_categories(), 4);
    assert_eq!(encoder.vocabulary(), &["fever", "headache", "chest_pain", "fatigue"]);

    for code in 0..encoder.n_categories() {
        let decoded = encoder.decode(code).unwrap().to_string();
        assert_eq!(encoder.encode(Some(&decoded)).unwrap(), code);
    }
}

#[test]
fn label_vocabulary_is_frozen_after_fit() {
    let table = complete_table();
    let (set, _, labels) = FittedTransformSet::fit(&table).unwrap();

    assert_eq!(set.n_classes(), 5);
    assert_eq!(labels, vec![0, 1, 2, 3, 4]);
    assert_eq!(set.label_encoder().decode(0), Some("flu"));
    assert_eq!(set.label_encoder().decode(4), Some("diabetes"));
    assert!(set.label_encoder().encode(Some("unseen_diagnosis")).is_err());
}

#[test]
fn nonzero_variance_columns_standardize() {
    let table = complete_table();
    let (_, features, _) = FittedTransformSet::fit(&table).unwrap();

    for column in features.columns() {
        let n = column.len() as f64;
        let mean = column.sum() / n;
        let std = (column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn constant_column_contributes_zero() {
    let table = DataTable::builder()
        .numeric("constant", vec![7.0, 7.0, 7.0])
        .numeric("varying", vec![1.0, 2.0, 3.0])
        .categorical("diagnosis", cat(&["a", "b", "a"]))
        .build()
        .unwrap();
    let (set, features, _) = FittedTransformSet::fit(&table).unwrap();

    for row in 0..3 {
        assert_abs_diff_eq!(features[[row, 0]], 0.0);
    }

    let vector = set
        .transform(&Record::new().with_number("constant", 7.0).with_number("varying", 2.0))
        .unwrap();
    assert_abs_diff_eq!(vector[0], 0.0);
}

#[test]
fn absent_feature_substitutes_zero_before_scaling() {
    let table = complete_table();
    let (set, _, _) = FittedTransformSet::fit(&table).unwrap();

    let full = record_for_row(&table, 0);
    let mut partial = Record::new();
    for (name, value) in full.iter() {
        if name != "heart_rate" {
            partial.insert(name, value.clone());
        }
    }

    let vector = set.transform(&partial).unwrap();
    // Position 2 is heart_rate in the frozen order; its raw value is 0.
    let names = set.feature_names();
    assert_eq!(names[2], "heart_rate");
    assert!(vector[2].is_finite());

    let full_vector = set.transform(&full).unwrap();
    assert!(vector[2] != full_vector[2]);
}

#[test]
fn unseen_category_fails_loudly() {
    let table = complete_table();
    let (set, _, _) = FittedTransformSet::fit(&table).unwrap();

    let record = Record::new().with_text("symptoms", "dizziness");
    match set.transform(&record) {
        Err(PreprocessError::UnknownCategory { column, value }) => {
            assert_eq!(column, "symptoms");
            assert_eq!(value, "dizziness");
        }
        other => panic!("expected UnknownCategory, got {:?}", other),
    }
}

#[test]
fn missing_values_are_fitted_not_dropped() {
    let table = DataTable::builder()
        .numeric("age", vec![10.0, f64::NAN, 30.0, f64::NAN])
        .categorical("gender", vec![Some("M".into()), None, Some("F".into()), None])
        .categorical("diagnosis", cat(&["a", "b", "a", "b"]))
        .build()
        .unwrap();
    let (set, features, _) = FittedTransformSet::fit(&table).unwrap();

    // Imputed rows carry the median of {10, 30}; encoded missing rows
    // carry the sentinel code. Replay must agree with both.
    let imputed = set.transform(&Record::new().with_number("age", f64::NAN)).unwrap();
    assert_abs_diff_eq!(imputed[0], features[[1, 0]], epsilon = 1e-12);

    let unknown = set.transform(&Record::new().with_text("gender", "Unknown")).unwrap();
    assert_abs_diff_eq!(unknown[1], features[[1, 1]], epsilon = 1e-12);
}
