use machine_learning::Classifier;
use serde::{Deserialize, Serialize};

use crate::status::ModelStatus;

/// A trained model bundled with the `Ready` status it was committed with.
///
/// Artifacts are never mutated, a new training run produces a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact<M> {
    pub status: ModelStatus,
    pub model: M,
}

impl<M: Classifier> Artifact<M> {
    /// Bundles `model` with a `Ready` status.
    ///
    /// # Arguments
    /// * `model` - The fitted model.
    /// * `status` - The status to commit along with it.
    pub fn new(model: M, status: ModelStatus) -> Self {
        Self { status, model }
    }

    /// The labels of the probability columns, as committed.
    pub fn classes(&self) -> &[String] {
        &self.status.classes
    }
}
