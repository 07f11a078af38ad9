use std::fmt;

use chrono::{DateTime, Utc};
use machine_learning::Evaluation;
use serde::{Deserialize, Serialize};

use crate::training::TrainingJob;

/// The lifecycle state of the served model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    NoModel,
    Training,
    Ready,
    Failed,
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelState::NoModel => "No Model Found",
            ModelState::Training => "Training",
            ModelState::Ready => "Model Ready",
            ModelState::Failed => "Training Failed",
        };

        f.write_str(s)
    }
}

/// An immutable snapshot of the model's status.
///
/// Every transition creates a new value through one of the constructors, which keep the
/// following invariants:
/// * `classes` and `evaluation` are only populated when `Ready`.
/// * `error` is only populated when `Failed`.
/// * `job` is only populated when `Training`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub state: ModelState,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub evaluation: Evaluation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job: Option<TrainingJob>,
}

impl ModelStatus {
    fn new(state: ModelState) -> Self {
        Self {
            state,
            timestamp: Utc::now(),
            classes: Vec::new(),
            evaluation: Evaluation::new(),
            error: None,
            job: None,
        }
    }

    pub fn no_model() -> Self {
        Self::new(ModelState::NoModel)
    }

    pub fn training(job: TrainingJob) -> Self {
        Self {
            job: Some(job),
            ..Self::new(ModelState::Training)
        }
    }

    pub fn ready(classes: Vec<String>, evaluation: Evaluation) -> Self {
        Self {
            classes,
            evaluation,
            ..Self::new(ModelState::Ready)
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(ModelState::Failed)
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == ModelState::Ready
    }

    pub fn is_training(&self) -> bool {
        self.state == ModelState::Training
    }
}

impl Default for ModelStatus {
    fn default() -> Self {
        Self::no_model()
    }
}

#[cfg(test)]
mod tests {
    use machine_learning::Metric;

    use super::*;
    use crate::training::JobId;

    #[test]
    fn test_constructors_keep_invariants() {
        let job = TrainingJob::new(JobId::new(1));

        let training = ModelStatus::training(job.clone());
        assert!(training.is_training());
        assert!(training.classes.is_empty());
        assert_eq!(training.job, Some(job));

        let failed = ModelStatus::failed("boom");
        assert_eq!(failed.state, ModelState::Failed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.evaluation.is_empty());

        let mut evaluation = Evaluation::new();
        evaluation.insert("accuracy".into(), Metric::Value(1.0));
        let ready = ModelStatus::ready(vec!["neg".into(), "pos".into()], evaluation);
        assert!(ready.is_ready());
        assert!(ready.error.is_none() && ready.job.is_none());
    }

    #[test]
    fn test_status_json_shape() {
        let json = serde_json::to_value(ModelStatus::no_model()).unwrap();

        assert_eq!(json["state"], "no_model");
        assert_eq!(json["classes"], serde_json::json!([]));
        assert!(json.get("error").is_none());
        assert!(json["timestamp"].is_string());

        let back: ModelStatus = serde_json::from_value(json).unwrap();
        assert_eq!(back.state, ModelState::NoModel);
    }
}
