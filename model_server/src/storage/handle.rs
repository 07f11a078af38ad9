use std::{ops::Deref, sync::Arc};

use log::warn;
use serde::{Serialize, de::DeserializeOwned};
use tokio::task;

use super::{Result, StorageErr, Store};
use crate::{artifact::Artifact, status::ModelStatus};

/// Typed contents of a store, parts that were missing or malformed are `None`.
#[derive(Debug)]
pub struct Loaded<M> {
    pub artifact: Option<Artifact<M>>,
    pub status: Option<ModelStatus>,
}

/// The typed interface to a `Store`.
///
/// It serializes artifacts and statuses to json and bridges the async runtime with the blocking
/// implementation of the underlying store.
pub struct ArtifactStore<S: Store>(Arc<S>);

impl<S: Store> Clone for ArtifactStore<S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S: Store> Deref for ArtifactStore<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Store> ArtifactStore<S> {
    /// Creates a new `ArtifactStore`.
    ///
    /// # Arguments
    /// * `store` - The underlying byte store.
    ///
    /// # Returns
    /// A new `ArtifactStore` instance.
    pub fn new(store: S) -> Self {
        Self(Arc::new(store))
    }

    /// Creates a new `ArtifactStore` sharing an already allocated store.
    pub fn shared(store: Arc<S>) -> Self {
        Self(store)
    }

    /// Durably stores `artifact` and makes its status the stored status.
    ///
    /// # Arguments
    /// * `artifact` - The artifact to persist.
    ///
    /// # Returns
    /// A `StorageErr` if either part couldn't be serialized or written.
    pub async fn save<M: Serialize>(&self, artifact: &Artifact<M>) -> Result<()> {
        let artifact_bytes = serde_json::to_vec(artifact)?;
        let status_bytes = serde_json::to_vec_pretty(&artifact.status)?;

        self.blocking(move |store| store.persist(&artifact_bytes, &status_bytes))
            .await
    }

    /// Durably stores `status`, leaving the stored artifact untouched.
    pub async fn save_status(&self, status: &ModelStatus) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(status)?;
        self.blocking(move |store| store.persist_status(&bytes)).await
    }

    /// Reads and deserializes the stored contents.
    ///
    /// A malformed part is logged and reported as missing, only a failure to read the store at
    /// all is an error.
    pub fn load<M: DeserializeOwned>(&self) -> Result<Loaded<M>> {
        let restored = self.0.restore()?;

        Ok(Loaded {
            artifact: restored
                .artifact
                .and_then(|bytes| Self::decode(&bytes, "artifact")),
            status: restored
                .status
                .and_then(|bytes| Self::decode(&bytes, "status")),
        })
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8], what: &str) -> Option<T> {
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("discarding malformed stored {what}: {e}");
                None
            }
        }
    }

    /// Runs a blocking store operation on tokio's blocking pool.
    async fn blocking<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&S) -> Result<()> + Send + 'static,
    {
        let store = Arc::clone(&self.0);

        task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| StorageErr::Interrupted(e.to_string()))?
    }
}
