pub mod dataset;
pub mod error;
pub mod estimator;
pub mod linear;
pub mod metrics;
pub mod pipeline;
mod test;
pub mod text;

pub use dataset::{Split, train_test_split};
pub use error::{MlErr, Result};
pub use estimator::{Classifier, Estimator};
pub use metrics::{ClassScores, ClassificationReport, Evaluation, Metric};
pub use pipeline::{PipelineConfig, TextClassifier, TextPipeline};
