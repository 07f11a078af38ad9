use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{Restored, Result, StorageErr, Store};

/// A `Store` kept in memory, it doesn't survive the process.
///
/// Writes can be made to fail on purpose through `fail_writes` and `fail_status_writes`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Restored>,
    fail_writes: AtomicBool,
    fail_status_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `MemoryStore` holding previously persisted contents.
    pub fn with_contents(contents: Restored) -> Self {
        Self {
            contents: Mutex::new(contents),
            ..Default::default()
        }
    }

    /// Makes every following write fail or succeed.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    /// Makes every following status write fail or succeed, artifact writes are unaffected.
    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_status_writes.store(fail, Ordering::Release);
    }

    /// A copy of the current contents.
    pub fn contents(&self) -> Restored {
        self.contents.lock().clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(StorageErr::Unavailable("writes are disabled".into()));
        }

        Ok(())
    }
}

impl Store for MemoryStore {
    fn persist_artifact(&self, bytes: &[u8]) -> Result<()> {
        self.check_writable()?;
        self.contents.lock().artifact = Some(bytes.to_vec());
        Ok(())
    }

    fn persist_status(&self, bytes: &[u8]) -> Result<()> {
        self.check_writable()?;

        if self.fail_status_writes.load(Ordering::Acquire) {
            return Err(StorageErr::Unavailable("status writes are disabled".into()));
        }

        self.contents.lock().status = Some(bytes.to_vec());
        Ok(())
    }

    fn discard_artifact(&self) -> Result<()> {
        self.check_writable()?;
        self.contents.lock().artifact = None;
        Ok(())
    }

    fn restore(&self) -> Result<Restored> {
        Ok(self.contents())
    }
}
