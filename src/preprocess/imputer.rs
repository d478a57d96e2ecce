//! Median imputation for numeric columns.

use serde::{Deserialize, Serialize};

use super::PreprocessError;

/// A fitted median imputer for one numeric column.
///
/// Fitting computes the median of the non-missing values; applying it
/// replaces `NaN` with that median and passes everything else through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianImputer {
    median: f64,
}

impl MedianImputer {
    /// Fit an imputer on a column. Missing values are `f64::NAN`.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::EmptyColumn`] if every value is missing.
    pub fn fit(column: &str, values: &[f64]) -> Result<Self, PreprocessError> {
        let mut present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if present.is_empty() {
            return Err(PreprocessError::EmptyColumn {
                column: column.to_string(),
            });
        }

        present.sort_by(|a, b| a.partial_cmp(b).expect("non-NaN values are ordered"));
        let n = present.len();
        let median = if n % 2 == 1 {
            present[n / 2]
        } else {
            (present[n / 2 - 1] + present[n / 2]) / 2.0
        };

        Ok(Self { median })
    }

    /// The fitted median.
    pub fn median(&self) -> f64 {
        self.median
    }

    /// Replace a missing value with the fitted median.
    #[inline]
    pub fn impute(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.median
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn median_odd_count() {
        let imputer = MedianImputer::fit("age", &[3.0, 1.0, 2.0]).unwrap();
        assert_abs_diff_eq!(imputer.median(), 2.0);
    }

    #[test]
    fn median_even_count() {
        let imputer = MedianImputer::fit("age", &[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_abs_diff_eq!(imputer.median(), 2.5);
    }

    #[test]
    fn median_skips_missing() {
        let imputer = MedianImputer::fit("age", &[f64::NAN, 10.0, f64::NAN, 20.0]).unwrap();
        assert_abs_diff_eq!(imputer.median(), 15.0);
    }

    #[test]
    fn impute_replaces_only_missing() {
        let imputer = MedianImputer::fit("age", &[10.0, 20.0, 30.0]).unwrap();
        assert_abs_diff_eq!(imputer.impute(f64::NAN), 20.0);
        assert_abs_diff_eq!(imputer.impute(42.0), 42.0);
    }

    #[test]
    fn all_missing_is_error() {
        let result = MedianImputer::fit("age", &[f64::NAN, f64::NAN]);
        assert!(matches!(
            result,
            Err(PreprocessError::EmptyColumn { column }) if column == "age"
        ));
    }

    #[test]
    fn empty_column_is_error() {
        assert!(MedianImputer::fit("age", &[]).is_err());
    }
}
