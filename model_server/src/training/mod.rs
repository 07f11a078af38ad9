mod config;
mod job;
mod runner;

pub use config::{DEFAULT_TEST_SIZE, TrainingConfig};
pub use job::{JobId, TrainingJob};
pub use runner::TrainingRunner;
