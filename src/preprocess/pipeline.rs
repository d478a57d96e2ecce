//! Fitted transform set: fit once on training data, replay at inference.
//!
//! [`FittedTransformSet`] is the single owner of all fitted transform
//! state. Training produces it exactly once; inference borrows it
//! read-only. The set and order of feature columns is frozen at fit time
//! and replayed identically for every record.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::data::{ColumnData, DataTable, Record, Value, LABEL_COLUMN};

use super::{CategoryEncoder, MedianImputer, PreprocessError, StandardScaler};

/// The fitted transform for one feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureTransform {
    /// Median imputation for a numeric column.
    Numeric(MedianImputer),
    /// Integer encoding for a categorical column.
    Categorical(CategoryEncoder),
}

/// All fitted preprocessing state for one training run.
///
/// Holds, in frozen column order, one [`FeatureTransform`] per feature,
/// the [`StandardScaler`] fitted over the full encoded feature matrix,
/// and the label encoder whose vocabulary is the canonical diagnosis set.
///
/// The value is immutable after fitting and safe to share read-only
/// across concurrent inference calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTransformSet {
    features: Vec<(String, FeatureTransform)>,
    scaler: StandardScaler,
    label_encoder: CategoryEncoder,
}

impl FittedTransformSet {
    /// Fit all transforms on a training table and return the encoded,
    /// scaled feature matrix `[n_samples, n_features]` plus the integer
    /// label vector.
    ///
    /// Feature order is the table's column order with the label column
    /// dropped; that order is frozen for the lifetime of the set.
    ///
    /// # Errors
    ///
    /// * [`PreprocessError::MissingLabelColumn`] if `diagnosis` is absent.
    /// * [`PreprocessError::SchemaMismatch`] if the label column is not
    ///   categorical.
    /// * [`PreprocessError::EmptyColumn`] if a numeric column has no
    ///   usable values.
    pub fn fit(table: &DataTable) -> Result<(Self, Array2<f64>, Vec<usize>), PreprocessError> {
        let label_column = table
            .column(LABEL_COLUMN)
            .ok_or_else(|| PreprocessError::MissingLabelColumn(LABEL_COLUMN.to_string()))?;

        let label_values = match label_column.data() {
            ColumnData::Categorical(values) => values,
            ColumnData::Numeric(_) => {
                return Err(PreprocessError::SchemaMismatch {
                    column: LABEL_COLUMN.to_string(),
                    expected: "categorical label column".to_string(),
                    got: "numeric column".to_string(),
                })
            }
        };

        let label_encoder = CategoryEncoder::fit(LABEL_COLUMN, label_values);
        let labels: Vec<usize> = label_values
            .iter()
            .map(|v| {
                label_encoder
                    .encode(v.as_deref())
                    .expect("fit-time labels are in the vocabulary")
            })
            .collect();

        let n_rows = table.n_rows();
        let feature_columns: Vec<_> = table
            .columns()
            .filter(|c| c.name() != LABEL_COLUMN)
            .collect();

        let mut features = Vec::with_capacity(feature_columns.len());
        let mut matrix = Array2::<f64>::zeros((n_rows, feature_columns.len()));

        for (j, column) in feature_columns.iter().enumerate() {
            match column.data() {
                ColumnData::Numeric(values) => {
                    let imputer = MedianImputer::fit(column.name(), values)?;
                    for (i, &value) in values.iter().enumerate() {
                        matrix[[i, j]] = imputer.impute(value);
                    }
                    features.push((column.name().to_string(), FeatureTransform::Numeric(imputer)));
                }
                ColumnData::Categorical(values) => {
                    let encoder = CategoryEncoder::fit(column.name(), values);
                    for (i, value) in values.iter().enumerate() {
                        let code = encoder
                            .encode(value.as_deref())
                            .expect("fit-time values are in the vocabulary");
                        matrix[[i, j]] = code as f64;
                    }
                    features.push((
                        column.name().to_string(),
                        FeatureTransform::Categorical(encoder),
                    ));
                }
            }
        }

        let scaler = StandardScaler::fit(matrix.view());
        for mut row in matrix.rows_mut() {
            scaler.transform_inplace(row.view_mut());
        }

        let set = Self {
            features,
            scaler,
            label_encoder,
        };
        Ok((set, matrix, labels))
    }

    /// Replay the fitted transforms on a single record.
    ///
    /// Every feature known to training is resolved in the frozen order:
    /// features absent from the record are substituted with `0` before
    /// scaling; numeric `NaN` is imputed with the fitted median; a
    /// categorical value outside the fit-time vocabulary is rejected.
    ///
    /// # Errors
    ///
    /// * [`PreprocessError::UnknownCategory`] for an unseen categorical
    ///   value.
    /// * [`PreprocessError::SchemaMismatch`] when a value has the wrong
    ///   type for its column.
    pub fn transform(&self, record: &Record) -> Result<Array1<f64>, PreprocessError> {
        let mut assembled = Array1::<f64>::zeros(self.features.len());

        for (j, (name, transform)) in self.features.iter().enumerate() {
            let raw = match (record.get(name), transform) {
                (None, _) => 0.0,
                (Some(Value::Number(v)), FeatureTransform::Numeric(imputer)) => imputer.impute(*v),
                (Some(Value::Text(s)), FeatureTransform::Categorical(encoder)) => {
                    encoder.encode(Some(s))? as f64
                }
                (Some(Value::Text(_)), FeatureTransform::Numeric(_)) => {
                    return Err(PreprocessError::SchemaMismatch {
                        column: name.clone(),
                        expected: "numeric value".to_string(),
                        got: "text value".to_string(),
                    })
                }
                (Some(Value::Number(_)), FeatureTransform::Categorical(_)) => {
                    return Err(PreprocessError::SchemaMismatch {
                        column: name.clone(),
                        expected: "text value".to_string(),
                        got: "numeric value".to_string(),
                    })
                }
            };
            assembled[j] = raw;
        }

        if assembled.len() != self.scaler.n_features() {
            return Err(PreprocessError::SchemaMismatch {
                column: "<features>".to_string(),
                expected: format!("{} columns", self.scaler.n_features()),
                got: format!("{} columns", assembled.len()),
            });
        }

        self.scaler.transform_inplace(assembled.view_mut());
        Ok(assembled)
    }

    /// Feature names in the frozen training order.
    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|(name, _)| name.clone()).collect()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// The canonical diagnosis vocabulary encoder.
    pub fn label_encoder(&self) -> &CategoryEncoder {
        &self.label_encoder
    }

    /// Number of diagnosis classes.
    pub fn n_classes(&self) -> usize {
        self.label_encoder.n_categories()
    }
}
