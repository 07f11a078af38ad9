use std::sync::Arc;

use log::{info, warn};
use machine_learning::Estimator;
use parking_lot::RwLock;
use tokio::sync::oneshot;

use super::{
    handle::TrainingHandle,
    slot::{SlotGuard, TrainingSlot},
    snapshot::Snapshot,
};
use crate::{
    artifact::Artifact,
    error::{ModelErr, Result},
    prediction::{self, Prediction},
    status::ModelStatus,
    storage::{ArtifactStore, Loaded, Store},
    training::{TrainingConfig, TrainingJob, TrainingRunner},
};

const INTERRUPTED: &str = "interrupted: the process stopped while training";

/// Owns the served model and its lifecycle.
///
/// Status reads and predictions work on the last committed snapshot and never wait for a
/// training job. At most one job runs at a time, a second request fails fast with
/// `AlreadyTraining`.
pub struct ModelManager<E: Estimator, S: Store> {
    inner: Arc<Inner<E, S>>,
}

impl<E: Estimator, S: Store> Clone for ModelManager<E, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<E: Estimator, S: Store> {
    runner: TrainingRunner<E>,
    store: ArtifactStore<S>,
    snapshot: RwLock<Arc<Snapshot<E::Model>>>,
    slot: TrainingSlot,
}

impl<E: Estimator, S: Store> ModelManager<E, S> {
    /// Creates a new `ModelManager` restoring whatever `store` holds.
    ///
    /// Opening never fails, a store that can't be read is logged and the manager starts without
    /// a model. A status persisted while training belongs to a dead process and is restored as
    /// `Failed`.
    ///
    /// # Arguments
    /// * `estimator` - The algorithm every training job fits.
    /// * `store` - Where artifacts and statuses are persisted.
    /// * `config` - The options of every training job.
    ///
    /// # Returns
    /// A new `ModelManager` instance.
    pub fn open(estimator: E, store: ArtifactStore<S>, config: TrainingConfig) -> Self {
        let snapshot = Self::restore(&store);
        info!("model status restored as {}", snapshot.status.state);

        let inner = Inner {
            runner: TrainingRunner::new(estimator, config),
            store,
            snapshot: RwLock::new(Arc::new(snapshot)),
            slot: TrainingSlot::new(),
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    fn restore(store: &ArtifactStore<S>) -> Snapshot<E::Model> {
        let Loaded { artifact, status } = match store.load::<E::Model>() {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("couldn't restore the stored model, starting without one: {e}");
                return Snapshot::new(ModelStatus::no_model(), None);
            }
        };

        let artifact = artifact.map(Arc::new);
        let committed = || {
            artifact
                .as_ref()
                .map(|artifact| artifact.status.clone())
                .unwrap_or_default()
        };

        let status = match status {
            Some(status) if status.is_training() => {
                warn!("found an interrupted training job, marking it as failed");
                ModelStatus::failed(INTERRUPTED)
            }
            Some(status) if status.is_ready() => committed(),
            Some(status) => status,
            None => committed(),
        };

        Snapshot::new(status, artifact)
    }

    /// The latest committed status.
    pub fn status(&self) -> ModelStatus {
        self.inner.snapshot.read().status.clone()
    }

    /// The training job in flight, if any.
    pub fn training_job(&self) -> Option<TrainingJob> {
        self.inner.slot.current()
    }

    /// Starts training a new model in the background.
    ///
    /// The `Training` status is persisted and published before returning, the job itself
    /// commits either a `Ready` status with its new artifact or a `Failed` status that keeps the
    /// previous artifact servable. Persisting and publishing happen on the job's own task, so
    /// dropping the returned future once the slot is taken doesn't stop the job from starting.
    ///
    /// # Arguments
    /// * `texts` - The documents of the dataset.
    /// * `labels` - The label of each document.
    ///
    /// # Returns
    /// A handle to the running job, `AlreadyTraining` if another job is in flight, or the
    /// `Storage` failure that prevented the job from starting.
    pub async fn start_training(
        &self,
        texts: Vec<String>,
        labels: Vec<String>,
    ) -> Result<TrainingHandle> {
        if texts.len() != labels.len() {
            return Err(ModelErr::InvalidInput(format!(
                "got {} texts but {} labels",
                texts.len(),
                labels.len()
            )));
        }

        let guard = self
            .inner
            .slot
            .acquire()
            .ok_or(ModelErr::AlreadyTraining)?;

        let job = guard.job().clone();
        let status = ModelStatus::training(job.clone());
        let (started_tx, started_rx) = oneshot::channel();

        let inner = Arc::clone(&self.inner);
        let training = status.clone();
        let task = tokio::spawn(async move {
            inner
                .start_job(guard, training, texts, labels, started_tx)
                .await
        });

        started_rx.await.map_err(|_| {
            ModelErr::TrainingAborted("the training task stopped before starting".into())
        })??;

        Ok(TrainingHandle::new(job, status, task))
    }

    /// Computes the class probabilities of every text with the committed model.
    ///
    /// # Arguments
    /// * `texts` - The input texts, at least one.
    ///
    /// # Returns
    /// One `Prediction` per text, `NoModel` if no model was ever committed.
    pub fn predict(&self, texts: &[String]) -> Result<Vec<Prediction>> {
        if texts.is_empty() {
            return Err(ModelErr::InvalidInput("no texts to predict".into()));
        }

        let artifact = self
            .inner
            .snapshot
            .read()
            .artifact
            .clone()
            .ok_or(ModelErr::NoModel)?;

        prediction::predict(&artifact.model, artifact.classes(), texts)
    }
}

impl<E: Estimator, S: Store> Inner<E, S> {
    /// Persists and publishes the `Training` status of a job, then runs it.
    ///
    /// The outcome of the start is sent through `started`, a failure releases the slot and
    /// leaves the committed status untouched.
    async fn start_job(
        &self,
        guard: SlotGuard,
        status: ModelStatus,
        texts: Vec<String>,
        labels: Vec<String>,
        started: oneshot::Sender<Result<()>>,
    ) -> ModelStatus {
        let job = guard.job().clone();

        if let Err(e) = self.store.save_status(&status).await {
            warn!(job = job.id.get(); "couldn't persist the training status: {e}");
            drop(guard);
            let _ = started.send(Err(e.into()));
            return self.snapshot.read().status.clone();
        }

        {
            let mut snapshot = self.snapshot.write();
            *snapshot = Arc::new(snapshot.with_status(status));
        }

        info!(job = job.id.get(), samples = texts.len(); "training started");
        let _ = started.send(Ok(()));

        self.run_job(guard, texts, labels).await
    }

    async fn run_job(
        &self,
        guard: SlotGuard,
        texts: Vec<String>,
        labels: Vec<String>,
    ) -> ModelStatus {
        let job = guard.job().clone();

        // the slot stays taken until the fit returns, even past a timeout
        let guard = Arc::new(guard);
        let hold = Arc::clone(&guard);

        let outcome = match self.runner.run(&job, texts, labels, hold).await {
            Ok(artifact) => match self.store.save(&artifact).await {
                Ok(()) => Ok(artifact),
                Err(e) => Err(ModelErr::from(e)),
            },
            Err(e) => Err(e),
        };

        match outcome {
            Ok(artifact) => {
                info!(job = job.id.get(); "model ready");
                self.commit(guard, artifact.status.clone(), Some(artifact))
            }
            Err(e) => {
                warn!(job = job.id.get(); "training failed: {e}");
                let status = ModelStatus::failed(&e);

                if let Err(e) = self.store.save_status(&status).await {
                    warn!(job = job.id.get(); "couldn't persist the failed status: {e}");
                }

                self.commit(guard, status, None)
            }
        }
    }

    /// Publishes the outcome of a job and releases the training slot in one critical section.
    ///
    /// A fit that outlived its timeout still shares the guard, the slot is then released when
    /// that fit returns.
    fn commit(
        &self,
        guard: Arc<SlotGuard>,
        status: ModelStatus,
        artifact: Option<Artifact<E::Model>>,
    ) -> ModelStatus {
        let mut snapshot = self.snapshot.write();

        *snapshot = Arc::new(match artifact {
            Some(artifact) => Snapshot::new(status.clone(), Some(Arc::new(artifact))),
            None => snapshot.with_status(status.clone()),
        });

        drop(guard);
        status
    }
}
