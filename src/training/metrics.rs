//! Classification metrics and the per-class report.

use serde::{Deserialize, Serialize};

/// Fraction of correct predictions. An empty set scores `0.0`.
pub fn accuracy(predictions: &[usize], labels: &[usize]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count();
    correct as f64 / labels.len() as f64
}

/// Precision, recall, F1, and support for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    /// Decoded class label.
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true instances of the class.
    pub support: usize,
}

/// Averaged precision/recall/F1 across classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAverages {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Full classification report over one evaluation set.
///
/// Covers every class in the canonical vocabulary, including classes with
/// zero support in the evaluation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Per-class metrics in class-code order.
    pub classes: Vec<ClassMetrics>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Unweighted mean over classes.
    pub macro_avg: ReportAverages,
    /// Support-weighted mean over classes.
    pub weighted_avg: ReportAverages,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1_score(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Build a [`ClassificationReport`] from predictions and true labels.
///
/// `class_names` is the canonical vocabulary in class-code order; both
/// `predictions` and `labels` hold codes into it.
pub fn classification_report(
    predictions: &[usize],
    labels: &[usize],
    class_names: &[String],
) -> ClassificationReport {
    let n_classes = class_names.len();
    let mut true_positives = vec![0usize; n_classes];
    let mut predicted = vec![0usize; n_classes];
    let mut support = vec![0usize; n_classes];

    for (&p, &l) in predictions.iter().zip(labels) {
        predicted[p] += 1;
        support[l] += 1;
        if p == l {
            true_positives[l] += 1;
        }
    }

    let classes: Vec<ClassMetrics> = (0..n_classes)
        .map(|k| {
            let precision = ratio(true_positives[k], predicted[k]);
            let recall = ratio(true_positives[k], support[k]);
            ClassMetrics {
                label: class_names[k].clone(),
                precision,
                recall,
                f1: f1_score(precision, recall),
                support: support[k],
            }
        })
        .collect();

    let n = n_classes as f64;
    let macro_avg = ReportAverages {
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
        f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
    };

    let total_support: usize = support.iter().sum();
    let weighted = |f: fn(&ClassMetrics) -> f64| -> f64 {
        if total_support == 0 {
            return 0.0;
        }
        classes
            .iter()
            .map(|c| f(c) * c.support as f64)
            .sum::<f64>()
            / total_support as f64
    };
    let weighted_avg = ReportAverages {
        precision: weighted(|c| c.precision),
        recall: weighted(|c| c.recall),
        f1: weighted(|c| c.f1),
    };

    ClassificationReport {
        classes,
        accuracy: accuracy(predictions, labels),
        macro_avg,
        weighted_avg,
    }
}

/// Mean and population standard deviation of a score list.
///
/// An empty list yields `(0.0, 0.0)`.
pub fn mean_std(scores: &[f64]) -> (f64, f64) {
    if scores.is_empty() {
        return (0.0, 0.0);
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
