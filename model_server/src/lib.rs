//! Lifecycle of a served text classification model: background training, durable storage and
//! probability predictions.

pub mod artifact;
pub mod error;
pub mod prediction;
pub mod service;
pub mod status;
pub mod storage;
pub mod training;

pub use artifact::Artifact;
pub use error::{ModelErr, Result};
pub use prediction::Prediction;
pub use service::{ModelManager, TrainingHandle};
pub use status::{ModelState, ModelStatus};
pub use training::{JobId, TrainingConfig, TrainingJob};
