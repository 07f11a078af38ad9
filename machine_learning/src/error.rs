use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug, Clone, PartialEq)]
pub enum MlErr {
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    EmptyDataset,
    InvalidTestSize {
        test_size: f32,
    },
    UnsplittableClass {
        class: String,
        samples: usize,
    },
    TooFewClasses {
        got: usize,
    },
    EmptyVocabulary {
        documents: usize,
    },
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MlErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => {
                format!(
                    "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
                )
            }
            MlErr::EmptyDataset => "The dataset doesn't contain any samples".to_string(),
            MlErr::InvalidTestSize { test_size } => {
                format!("The test size must be a fraction in (0, 1), got {test_size}")
            }
            MlErr::UnsplittableClass { class, samples } => format!(
                "The class '{class}' has {samples} sample(s), at least 2 are needed to appear in both the train and test splits"
            ),
            MlErr::TooFewClasses { got } => {
                format!("At least 2 distinct classes are needed to fit a classifier, got {got}")
            }
            MlErr::EmptyVocabulary { documents } => format!(
                "After pruning, no terms remain in the vocabulary of {documents} document(s)"
            ),
        };

        write!(f, "{s}")
    }
}

impl Error for MlErr {}
