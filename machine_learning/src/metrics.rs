//! Evaluation metrics for classification models.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// An evaluation keyed by metric name, shaped like a classification report.
pub type Evaluation = BTreeMap<String, Metric>;

pub const ACCURACY: &str = "accuracy";
pub const MACRO_AVG: &str = "macro avg";
pub const WEIGHTED_AVG: &str = "weighted avg";

/// A single evaluation entry, either a scalar or a set of per-class scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Value(f64),
    Scores(ClassScores),
}

/// Precision, recall and f1 of one class or of an aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

/// `num / den`, or zero when the ratio is undefined.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

/// Per-class and aggregated scores of a set of predictions.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub per_class: BTreeMap<String, ClassScores>,
    pub accuracy: f64,
    pub macro_avg: ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    /// Builds the report of `y_pred` against `y_true`.
    ///
    /// The reported classes are the sorted union of both label sets. Undefined ratios, such as
    /// the precision of a class that was never predicted, are reported as zero.
    ///
    /// # Arguments
    /// * `y_true` - The expected labels.
    /// * `y_pred` - The predicted labels, same length as `y_true`.
    pub fn new(y_true: &[String], y_pred: &[String]) -> Self {
        let classes: BTreeSet<&String> = y_true.iter().chain(y_pred).collect();

        let mut per_class = BTreeMap::new();
        for class in classes {
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;

            for (truth, pred) in y_true.iter().zip(y_pred) {
                match (truth == class, pred == class) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }

            let precision = ratio(tp as f64, (tp + fp) as f64);
            let recall = ratio(tp as f64, (tp + fn_) as f64);
            let f1_score = ratio(2.0 * precision * recall, precision + recall);

            per_class.insert(
                class.clone(),
                ClassScores {
                    precision,
                    recall,
                    f1_score,
                    support: tp + fn_,
                },
            );
        }

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        let accuracy = ratio(correct as f64, y_true.len() as f64);

        let n_classes = per_class.len() as f64;
        let total_support: usize = per_class.values().map(|s| s.support).sum();

        let mut macro_avg = ClassScores {
            support: total_support,
            ..Default::default()
        };
        let mut weighted_avg = macro_avg;

        for scores in per_class.values() {
            let weight = ratio(scores.support as f64, total_support as f64);

            macro_avg.precision += ratio(scores.precision, n_classes);
            macro_avg.recall += ratio(scores.recall, n_classes);
            macro_avg.f1_score += ratio(scores.f1_score, n_classes);

            weighted_avg.precision += scores.precision * weight;
            weighted_avg.recall += scores.recall * weight;
            weighted_avg.f1_score += scores.f1_score * weight;
        }

        Self {
            per_class,
            accuracy,
            macro_avg,
            weighted_avg,
        }
    }

    /// Flattens the report into an `Evaluation` map.
    pub fn into_evaluation(self) -> Evaluation {
        let mut evaluation: Evaluation = self
            .per_class
            .into_iter()
            .map(|(class, scores)| (class, Metric::Scores(scores)))
            .collect();

        evaluation.insert(ACCURACY.into(), Metric::Value(self.accuracy));
        evaluation.insert(MACRO_AVG.into(), Metric::Scores(self.macro_avg));
        evaluation.insert(WEIGHTED_AVG.into(), Metric::Scores(self.weighted_avg));
        evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_perfect_predictions() {
        let y = labels(&["neg", "pos", "pos"]);
        let report = ClassificationReport::new(&y, &y);

        assert_eq!(report.accuracy, 1.0);
        for scores in report.per_class.values() {
            assert_eq!(scores.precision, 1.0);
            assert_eq!(scores.recall, 1.0);
            assert_eq!(scores.f1_score, 1.0);
        }
        assert_eq!(report.per_class["pos"].support, 2);
        assert_eq!(report.weighted_avg.support, 3);
    }

    #[test]
    fn test_never_predicted_class_scores_zero() {
        let y_true = labels(&["a", "a", "b", "b"]);
        let y_pred = labels(&["a", "a", "a", "a"]);
        let report = ClassificationReport::new(&y_true, &y_pred);

        let b = report.per_class["b"];
        assert_eq!(b.precision, 0.0);
        assert_eq!(b.recall, 0.0);
        assert_eq!(b.f1_score, 0.0);
        assert_eq!(b.support, 2);

        let a = report.per_class["a"];
        assert!(close(a.precision, 0.5));
        assert!(close(a.recall, 1.0));
        assert!(close(a.f1_score, 2.0 / 3.0));

        assert!(close(report.accuracy, 0.5));
        assert!(close(report.macro_avg.precision, 0.25));
        assert!(close(report.weighted_avg.f1_score, 1.0 / 3.0));
    }

    #[test]
    fn test_predicted_only_class_is_reported() {
        let report = ClassificationReport::new(&labels(&["a", "b"]), &labels(&["a", "c"]));

        let c = report.per_class["c"];
        assert_eq!(c.support, 0);
        assert_eq!(c.precision, 0.0);
        assert_eq!(report.per_class.len(), 3);
    }

    #[test]
    fn test_empty_report_does_not_divide_by_zero() {
        let report = ClassificationReport::new(&[], &[]);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.macro_avg, ClassScores::default());
    }

    #[test]
    fn test_evaluation_serializes_like_a_report() {
        let y = labels(&["neg", "pos"]);
        let evaluation = ClassificationReport::new(&y, &y).into_evaluation();

        let json = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(json["accuracy"], 1.0);
        assert_eq!(json["neg"]["f1-score"], 1.0);
        assert_eq!(json["macro avg"]["support"], 2);

        let back: Evaluation = serde_json::from_value(json).unwrap();
        assert_eq!(back, evaluation);
    }
}
