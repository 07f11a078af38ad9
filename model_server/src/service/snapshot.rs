use std::sync::Arc;

use crate::{artifact::Artifact, status::ModelStatus};

/// The committed `(status, artifact)` pair.
///
/// Snapshots are immutable, every transition swaps in a new one so readers never observe a
/// status that belongs to a different artifact.
#[derive(Debug)]
pub(super) struct Snapshot<M> {
    pub status: ModelStatus,
    pub artifact: Option<Arc<Artifact<M>>>,
}

impl<M> Snapshot<M> {
    pub fn new(status: ModelStatus, artifact: Option<Arc<Artifact<M>>>) -> Self {
        Self { status, artifact }
    }

    /// A new snapshot with `status` that keeps serving the current artifact.
    pub fn with_status(&self, status: ModelStatus) -> Self {
        Self {
            status,
            artifact: self.artifact.clone(),
        }
    }
}
