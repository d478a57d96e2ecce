//! Integer encoding for categorical columns.

use serde::{Deserialize, Serialize};

use super::PreprocessError;

/// Sentinel that replaces missing categorical values before fitting.
pub const MISSING_SENTINEL: &str = "Unknown";

/// A fitted categorical encoder for one column.
///
/// Fitting replaces missing values with the literal sentinel `"Unknown"`,
/// then assigns integer codes to distinct values in **first-seen order**.
/// The resulting mapping is a bijection onto `{0, …, |vocab|-1}` and is
/// frozen after fitting: encoding a value outside the fit-time vocabulary
/// fails with [`PreprocessError::UnknownCategory`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    column: String,
    vocab: Vec<String>,
}

impl CategoryEncoder {
    /// Fit an encoder on a column. Missing values are `None`.
    pub fn fit(column: &str, values: &[Option<String>]) -> Self {
        let mut vocab: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_deref().unwrap_or(MISSING_SENTINEL);
            if !vocab.iter().any(|v| v == value) {
                vocab.push(value.to_string());
            }
        }
        Self {
            column: column.to_string(),
            vocab,
        }
    }

    /// The column this encoder was fitted on.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Vocabulary size.
    pub fn n_categories(&self) -> usize {
        self.vocab.len()
    }

    /// The fit-time vocabulary in code order.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocab
    }

    /// Look up the code for a value, if it was seen at fit time.
    pub fn code_of(&self, value: &str) -> Option<usize> {
        self.vocab.iter().position(|v| v == value)
    }

    /// Encode a value to its integer code.
    ///
    /// Missing values (`None`) take the `"Unknown"` sentinel path, which
    /// only succeeds when missing values were observed at fit time.
    ///
    /// # Errors
    ///
    /// Returns [`PreprocessError::UnknownCategory`] for values outside the
    /// fit-time vocabulary.
    pub fn encode(&self, value: Option<&str>) -> Result<usize, PreprocessError> {
        let value = value.unwrap_or(MISSING_SENTINEL);
        self.code_of(value)
            .ok_or_else(|| PreprocessError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    /// Decode an integer code back to its original value.
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.vocab.get(code).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn codes_follow_first_seen_order() {
        let encoder = CategoryEncoder::fit("symptoms", &cat(&["fever", "cough", "fever", "rash"]));
        assert_eq!(encoder.vocabulary(), &["fever", "cough", "rash"]);
        assert_eq!(encoder.encode(Some("fever")).unwrap(), 0);
        assert_eq!(encoder.encode(Some("cough")).unwrap(), 1);
        assert_eq!(encoder.encode(Some("rash")).unwrap(), 2);
    }

    #[test]
    fn missing_maps_to_sentinel() {
        let encoder =
            CategoryEncoder::fit("gender", &[Some("M".to_string()), None, Some("F".to_string())]);
        // Sentinel takes the code at its first-seen position.
        assert_eq!(encoder.vocabulary(), &["M", "Unknown", "F"]);
        assert_eq!(encoder.encode(None).unwrap(), 1);
    }

    #[test]
    fn bijection_roundtrip() {
        let encoder = CategoryEncoder::fit("symptoms", &cat(&["a", "c", "b"]));
        for code in 0..encoder.n_categories() {
            let value = encoder.decode(code).unwrap().to_string();
            assert_eq!(encoder.encode(Some(&value)).unwrap(), code);
        }
        assert_eq!(encoder.decode(encoder.n_categories()), None);
    }

    #[test]
    fn unseen_value_is_error() {
        let encoder = CategoryEncoder::fit("gender", &cat(&["M", "F"]));
        let result = encoder.encode(Some("X"));
        assert!(matches!(
            result,
            Err(PreprocessError::UnknownCategory { column, value })
                if column == "gender" && value == "X"
        ));
    }

    #[test]
    fn missing_without_fit_time_missing_is_error() {
        // No missing values at fit time, so the sentinel is absent from
        // the vocabulary and the missing path must fail loudly.
        let encoder = CategoryEncoder::fit("gender", &cat(&["M", "F"]));
        assert!(encoder.encode(None).is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let encoder = CategoryEncoder::fit("symptoms", &cat(&["fever", "cough"]));
        let json = serde_json::to_string(&encoder).unwrap();
        let restored: CategoryEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, encoder);
        assert_eq!(restored.encode(Some("cough")).unwrap(), 1);
    }
}
