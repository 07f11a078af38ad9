use std::{error::Error, fmt, io, path::PathBuf};

/// The specific result type of the storage module.
pub type Result<T> = std::result::Result<T, StorageErr>;

/// Failures while persisting or restoring the model.
#[derive(Debug)]
pub enum StorageErr {
    Io { path: PathBuf, source: io::Error },
    Serde(serde_json::Error),
    /// The backing store refused the operation.
    Unavailable(String),
    /// The blocking storage task didn't run to completion.
    Interrupted(String),
}

impl StorageErr {
    pub(super) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for StorageErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {}: {source}", path.display()),
            Self::Serde(e) => write!(f, "malformed stored data: {e}"),
            Self::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
            Self::Interrupted(msg) => write!(f, "storage task interrupted: {msg}"),
        }
    }
}

impl Error for StorageErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serde(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StorageErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e)
    }
}
