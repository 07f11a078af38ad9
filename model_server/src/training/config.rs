use std::time::Duration;

pub const DEFAULT_TEST_SIZE: f32 = 0.25;

/// Options of every training attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    /// Fraction of each class held out for evaluation.
    pub test_size: f32,
    /// Seed of the train/test split, drawn from the os when missing.
    pub seed: Option<u64>,
    /// Upper bound of a single attempt, unbounded when missing.
    pub timeout: Option<Duration>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            seed: None,
            timeout: None,
        }
    }
}
