use tokio::task::JoinHandle;

use crate::{
    error::{ModelErr, Result},
    status::ModelStatus,
    training::TrainingJob,
};

/// A training job running in the background.
///
/// Dropping the handle detaches the job, it never cancels it.
#[derive(Debug)]
pub struct TrainingHandle {
    job: TrainingJob,
    started: ModelStatus,
    task: JoinHandle<ModelStatus>,
}

impl TrainingHandle {
    pub(super) fn new(
        job: TrainingJob,
        started: ModelStatus,
        task: JoinHandle<ModelStatus>,
    ) -> Self {
        Self { job, started, task }
    }

    pub fn job(&self) -> &TrainingJob {
        &self.job
    }

    /// The `Training` status published when the job started.
    pub fn started(&self) -> &ModelStatus {
        &self.started
    }

    /// Waits for the job to finish.
    ///
    /// # Returns
    /// The status the job committed, either `Ready` or `Failed`.
    pub async fn wait(self) -> Result<ModelStatus> {
        self.task
            .await
            .map_err(|e| ModelErr::TrainingAborted(e.to_string()))
    }
}
