use std::{error::Error, fmt, time::Duration};

use machine_learning::MlErr;

use crate::storage::StorageErr;

/// The model server's result type.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// Failures of the model lifecycle.
///
/// Request time failures (`AlreadyTraining`, `NoModel`, `InvalidInput`, `InvalidModel`) are
/// returned to the caller, training time failures end up recorded in the model's status.
#[derive(Debug)]
pub enum ModelErr {
    /// A training job is already in flight.
    AlreadyTraining,
    /// No model has ever been trained.
    NoModel,
    InvalidInput(String),
    /// The served artifact produced an output that doesn't match its classes.
    InvalidModel(String),
    /// The dataset couldn't be partitioned into train and test splits.
    Split(MlErr),
    /// The estimator couldn't fit the training split.
    Fit(MlErr),
    /// The training task died before producing a model.
    TrainingAborted(String),
    TimedOut(Duration),
    Storage(StorageErr),
}

impl fmt::Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyTraining => {
                f.write_str("A training process is already running, please wait")
            }
            Self::NoModel => f.write_str("No trained model was found"),
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::InvalidModel(msg) => write!(f, "invalid model: {msg}"),
            Self::Split(e) => write!(f, "split error: {e}"),
            Self::Fit(e) => write!(f, "fit error: {e}"),
            Self::TrainingAborted(msg) => write!(f, "training aborted: {msg}"),
            Self::TimedOut(limit) => {
                write!(f, "training exceeded its time limit of {limit:?}")
            }
            Self::Storage(e) => write!(f, "storage error: {e}"),
        }
    }
}

impl Error for ModelErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Split(e) | Self::Fit(e) => Some(e),
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StorageErr> for ModelErr {
    fn from(e: StorageErr) -> Self {
        Self::Storage(e)
    }
}
