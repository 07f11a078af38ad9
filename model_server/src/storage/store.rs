use log::warn;

use super::Result;

/// The raw contents of a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Restored {
    pub artifact: Option<Vec<u8>>,
    pub status: Option<Vec<u8>>,
}

/// Durable single slot storage for the serialized model artifact and status.
///
/// Every write fully replaces the previous value, a reader must never observe a partially
/// written one. There is no versioning.
pub trait Store: Send + Sync + 'static {
    /// Replaces the stored artifact.
    fn persist_artifact(&self, bytes: &[u8]) -> Result<()>;

    /// Replaces the stored status.
    fn persist_status(&self, bytes: &[u8]) -> Result<()>;

    /// Removes the stored artifact, if any.
    fn discard_artifact(&self) -> Result<()>;

    /// Replaces both the artifact and the status, the artifact is written first.
    ///
    /// If the status can't be written the previous artifact is put back, the store then holds
    /// exactly what it held before the call.
    fn persist(&self, artifact: &[u8], status: &[u8]) -> Result<()> {
        let previous = self.restore()?.artifact;
        self.persist_artifact(artifact)?;

        let Err(e) = self.persist_status(status) else {
            return Ok(());
        };

        let rollback = match previous {
            Some(bytes) => self.persist_artifact(&bytes),
            None => self.discard_artifact(),
        };

        if let Err(rollback_err) = rollback {
            warn!("couldn't restore the previous artifact: {rollback_err}");
        }

        Err(e)
    }

    /// Reads whatever is currently stored.
    fn restore(&self) -> Result<Restored>;
}
