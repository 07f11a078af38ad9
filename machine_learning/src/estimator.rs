use ndarray::{Array2, Axis};
use serde::{Serialize, de::DeserializeOwned};

use crate::Result;

/// A trainable text classification algorithm.
///
/// Implementors are the pluggable part of the training pipeline: they only need to turn a set of
/// labeled documents into a fitted `Classifier`. The fitted model must be serializable, since it
/// is what gets persisted between restarts.
pub trait Estimator: Send + Sync + 'static {
    type Model: Classifier + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Fits a new model.
    ///
    /// # Arguments
    /// * `texts` - The training documents.
    /// * `labels` - The label of each document.
    ///
    /// # Returns
    /// The fitted model or an `MlErr` if the data can't be fitted.
    fn fit(&self, texts: &[String], labels: &[String]) -> Result<Self::Model>;
}

/// A fitted text classifier.
pub trait Classifier {
    /// The sorted labels this classifier distinguishes, one per probability column.
    fn classes(&self) -> &[String];

    /// Computes the class probabilities of each document.
    ///
    /// # Returns
    /// A `texts x classes` matrix, columns follow `classes`.
    fn predict_proba(&self, texts: &[String]) -> Result<Array2<f32>>;

    /// Predicts the most likely label of each document.
    fn predict(&self, texts: &[String]) -> Result<Vec<String>> {
        let proba = self.predict_proba(texts)?;
        let classes = self.classes();

        let labels = proba
            .axis_iter(Axis(0))
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0, f32::NEG_INFINITY), |best, (i, &p)| {
                        if p > best.1 { (i, p) } else { best }
                    })
                    .0;

                classes[best].clone()
            })
            .collect();

        Ok(labels)
    }
}
