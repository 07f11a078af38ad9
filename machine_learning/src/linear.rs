use std::collections::BTreeSet;

use ndarray::{Array1, Array2, Axis};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result, text::SparseRow};

/// Training options of a `LogisticRegression`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRegConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    /// Weight decay applied once per epoch.
    pub l2: f32,
    pub batch_size: usize,
    pub seed: u64,
}

impl Default for LogRegConfig {
    fn default() -> Self {
        Self {
            epochs: 100,
            learning_rate: 0.5,
            l2: 1e-4,
            batch_size: 32,
            seed: 42,
        }
    }
}

/// Numerically stable softmax over a logits vector.
pub fn softmax(logits: &Array1<f32>) -> Array1<f32> {
    if logits.is_empty() {
        return Array1::zeros(0);
    }

    let max = logits.fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exps = logits.mapv(|v| (v - max).exp());
    let sum = exps.sum();

    if sum == 0.0 || !sum.is_finite() {
        return Array1::from_elem(logits.len(), 1.0 / logits.len() as f32);
    }

    exps / sum
}

/// Multinomial logistic regression over sparse features, trained with mini-batch gradient descent.
#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    config: LogRegConfig,
}

impl LogisticRegression {
    /// Creates a new `LogisticRegression`.
    ///
    /// # Arguments
    /// * `config` - The training options.
    ///
    /// # Returns
    /// A new `LogisticRegression` instance.
    pub fn new(config: LogRegConfig) -> Self {
        Self { config }
    }

    /// Fits a model on `rows` with their `labels`.
    ///
    /// The model's classes are the sorted distinct labels.
    ///
    /// # Arguments
    /// * `rows` - The feature rows, every index must be lower than `features`.
    /// * `labels` - The label of each row.
    /// * `features` - The dimension of the feature space.
    ///
    /// # Returns
    /// The fitted model or an `MlErr` on mismatched inputs or when there are less than two
    /// classes.
    pub fn fit(
        &self,
        rows: &[SparseRow],
        labels: &[String],
        features: usize,
    ) -> Result<LogRegModel> {
        if rows.len() != labels.len() {
            return Err(MlErr::SizeMismatch {
                a: "rows",
                b: "labels",
                got: rows.len(),
                expected: labels.len(),
            });
        }

        if rows.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if classes.len() < 2 {
            return Err(MlErr::TooFewClasses { got: classes.len() });
        }

        let targets: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let LogRegConfig {
            epochs,
            learning_rate: lr,
            l2,
            batch_size,
            seed,
        } = self.config.clone();

        let mut model = LogRegModel {
            weights: Array2::zeros((features, classes.len())),
            bias: Array1::zeros(classes.len()),
            classes,
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..rows.len()).collect();
        let decay = 1.0 - lr * l2.max(0.0);

        for _ in 0..epochs {
            order.shuffle(&mut rng);

            for batch in order.chunks(batch_size.max(1)) {
                let scale = lr / batch.len() as f32;

                // Gradients are computed against the weights at the start of the batch.
                let diffs: Vec<Array1<f32>> = batch
                    .iter()
                    .map(|&i| {
                        let mut diff = model.proba_one(&rows[i]);
                        diff[targets[i]] -= 1.0;
                        diff
                    })
                    .collect();

                for (&i, diff) in batch.iter().zip(&diffs) {
                    for (feature, value) in rows[i].iter() {
                        model
                            .weights
                            .row_mut(feature)
                            .scaled_add(-scale * value, diff);
                    }

                    model.bias.scaled_add(-scale, diff);
                }
            }

            model.weights *= decay;
        }

        Ok(model)
    }
}

/// A fitted multinomial logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRegModel {
    classes: Vec<String>,
    /// `features x classes`
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl LogRegModel {
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// The raw class scores of a single row, features outside of the model are ignored.
    fn decision(&self, row: &SparseRow) -> Array1<f32> {
        let mut logits = self.bias.clone();

        for (feature, value) in row.iter() {
            if feature < self.weights.nrows() {
                logits.scaled_add(value, &self.weights.row(feature));
            }
        }

        logits
    }

    fn proba_one(&self, row: &SparseRow) -> Array1<f32> {
        softmax(&self.decision(row))
    }

    /// Computes the class probabilities of every row.
    ///
    /// # Returns
    /// A `rows x classes` matrix whose rows sum to one.
    pub fn predict_proba(&self, rows: &[SparseRow]) -> Array2<f32> {
        let mut out = Array2::zeros((rows.len(), self.classes.len()));

        for (mut out_row, row) in out.axis_iter_mut(Axis(0)).zip(rows) {
            out_row.assign(&self.proba_one(row));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn one_hot(feature: usize) -> SparseRow {
        SparseRow {
            indices: vec![feature],
            values: vec![1.0],
        }
    }

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&array![1.0, 2.0, 3.0]);
        assert!((p.sum() - 1.0).abs() < 1e-6);
        assert!(p[2] > p[1] && p[1] > p[0]);

        let p = softmax(&array![1000.0, 1000.0]);
        assert_eq!(p, array![0.5, 0.5]);
    }

    #[test]
    fn test_separable_features_are_learned() {
        let rows = [one_hot(0), one_hot(0), one_hot(1), one_hot(1)];
        let y = labels(&["pos", "pos", "neg", "neg"]);

        let model = LogisticRegression::default().fit(&rows, &y, 2).unwrap();
        assert_eq!(model.classes(), ["neg", "pos"]);

        let proba = model.predict_proba(&[one_hot(0), one_hot(1)]);
        assert!(proba[[0, 1]] > 0.8);
        assert!(proba[[1, 0]] > 0.8);
    }

    #[test]
    fn test_unknown_row_falls_back_to_the_bias() {
        let rows = [one_hot(0), one_hot(1)];
        let model = LogisticRegression::default()
            .fit(&rows, &labels(&["a", "b"]), 2)
            .unwrap();

        let proba = model.predict_proba(&[SparseRow::default(), one_hot(99)]);
        for row in proba.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-5);
        }
        assert_eq!(proba.row(0), proba.row(1));
    }

    #[test]
    fn test_needs_two_classes() {
        let rows = [one_hot(0), one_hot(1)];
        let err = LogisticRegression::default()
            .fit(&rows, &labels(&["a", "a"]), 2)
            .unwrap_err();

        assert_eq!(err, MlErr::TooFewClasses { got: 1 });
    }
}
