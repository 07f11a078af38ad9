use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use super::{Restored, Result, StorageErr, Store};

const ARTIFACT_FILE: &str = "model_artifact.json";
const STATUS_FILE: &str = "model_status.json";

/// A `Store` backed by two files inside a directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    /// Creates a new `FsStore`, creating `dir` if it doesn't exist.
    ///
    /// # Arguments
    /// * `dir` - The storage directory.
    ///
    /// # Returns
    /// A new `FsStore` or an io error if the directory can't be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageErr::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.dir.join(ARTIFACT_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    /// Writes into a sibling temporary file, syncs it and renames it over `path`.
    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");

        let write = || -> io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()
        };

        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(StorageErr::io(&tmp, e));
        }

        fs::rename(&tmp, path).map_err(|e| StorageErr::io(path, e))
    }

    fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageErr::io(path, e)),
        }
    }
}

impl Store for FsStore {
    fn persist_artifact(&self, bytes: &[u8]) -> Result<()> {
        Self::write_atomic(&self.artifact_path(), bytes)
    }

    fn persist_status(&self, bytes: &[u8]) -> Result<()> {
        Self::write_atomic(&self.status_path(), bytes)
    }

    fn discard_artifact(&self) -> Result<()> {
        let path = self.artifact_path();

        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageErr::io(&path, e)),
        }
    }

    fn restore(&self) -> Result<Restored> {
        Ok(Restored {
            artifact: Self::read_optional(&self.artifact_path())?,
            status: Self::read_optional(&self.status_path())?,
        })
    }
}
