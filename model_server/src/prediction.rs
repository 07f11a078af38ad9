use std::collections::BTreeMap;

use machine_learning::Classifier;
use ndarray::Axis;
use serde::{Deserialize, Serialize};

use crate::error::{ModelErr, Result};

/// The class probabilities of a single text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub text: String,
    pub predictions: BTreeMap<String, f64>,
}

fn round3(p: f32) -> f64 {
    (f64::from(p) * 1000.0).round() / 1000.0
}

/// Computes the class probabilities of every text.
///
/// Values are rounded to 3 decimal places and never renormalized.
///
/// # Arguments
/// * `model` - The fitted classifier.
/// * `classes` - The labels of the model's probability columns.
/// * `texts` - The input texts, empty strings are valid.
///
/// # Returns
/// One `Prediction` per text, in input order, or `InvalidModel` if the model's output doesn't
/// match `classes`.
pub fn predict<C: Classifier>(
    model: &C,
    classes: &[String],
    texts: &[String],
) -> Result<Vec<Prediction>> {
    let proba = model
        .predict_proba(texts)
        .map_err(|e| ModelErr::InvalidModel(e.to_string()))?;

    if proba.ncols() != classes.len() || proba.nrows() != texts.len() {
        return Err(ModelErr::InvalidModel(format!(
            "expected a {}x{} probability matrix, got {}x{}",
            texts.len(),
            classes.len(),
            proba.nrows(),
            proba.ncols()
        )));
    }

    let predictions = texts
        .iter()
        .zip(proba.axis_iter(Axis(0)))
        .map(|(text, row)| Prediction {
            text: text.clone(),
            predictions: classes
                .iter()
                .cloned()
                .zip(row.iter().copied().map(round3))
                .collect(),
        })
        .collect();

    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use machine_learning::{Estimator, TextPipeline};
    use ndarray::{Array2, array};

    use super::*;

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    struct Fixed(Vec<String>, Array2<f32>);

    impl Classifier for Fixed {
        fn classes(&self) -> &[String] {
            &self.0
        }

        fn predict_proba(&self, _texts: &[String]) -> machine_learning::Result<Array2<f32>> {
            Ok(self.1.clone())
        }
    }

    #[test]
    fn test_rounds_to_three_decimals() {
        let classes = strings(&["neg", "pos"]);
        let model = Fixed(classes.clone(), array![[0.12345, 0.87655]]);

        let out = predict(&model, &classes, &strings(&["meh"])).unwrap();

        assert_eq!(out[0].text, "meh");
        assert_eq!(out[0].predictions["neg"], 0.123);
        assert_eq!(out[0].predictions["pos"], 0.877);
    }

    #[test]
    fn test_class_count_mismatch() {
        let classes = strings(&["a", "b", "c"]);
        let model = Fixed(strings(&["a", "b"]), array![[0.5, 0.5]]);

        let err = predict(&model, &classes, &strings(&["x"])).unwrap_err();
        assert!(matches!(err, ModelErr::InvalidModel(_)));
    }

    #[test]
    fn test_fitted_pipeline_sums_to_one() {
        let texts = strings(&["good product", "bad product", "great", "terrible"]);
        let labels = strings(&["pos", "neg", "pos", "neg"]);
        let model = TextPipeline::default().fit(&texts, &labels).unwrap();

        let out = predict(&model, model.classes(), &strings(&["good", "", "unseen words"])).unwrap();

        assert_eq!(out.len(), 3);
        for prediction in out {
            let keys: Vec<_> = prediction.predictions.keys().cloned().collect();
            assert_eq!(keys, ["neg", "pos"]);

            let sum: f64 = prediction.predictions.values().sum();
            assert!((sum - 1.0).abs() <= 0.002, "sum was {sum}");
        }
    }
}
