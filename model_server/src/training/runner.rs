use std::{sync::Arc, time::Instant};

use log::{debug, info};
use machine_learning::{ClassificationReport, Classifier, Estimator, train_test_split};
use tokio::{task, time};

use super::{TrainingConfig, TrainingJob};
use crate::{
    artifact::Artifact,
    error::{ModelErr, Result},
    status::ModelStatus,
};

/// Runs training attempts of a given estimator.
///
/// An attempt splits the dataset, fits the estimator on the training half and evaluates the fitted
/// model on the held out half. All of the cpu bound work happens on tokio's blocking pool.
pub struct TrainingRunner<E: Estimator> {
    estimator: Arc<E>,
    config: TrainingConfig,
}

impl<E: Estimator> Clone for TrainingRunner<E> {
    fn clone(&self) -> Self {
        Self {
            estimator: Arc::clone(&self.estimator),
            config: self.config.clone(),
        }
    }
}

impl<E: Estimator> TrainingRunner<E> {
    /// Creates a new `TrainingRunner`.
    ///
    /// # Arguments
    /// * `estimator` - The algorithm to fit.
    /// * `config` - The options of every attempt.
    ///
    /// # Returns
    /// A new `TrainingRunner` instance.
    pub fn new(estimator: E, config: TrainingConfig) -> Self {
        Self {
            estimator: Arc::new(estimator),
            config,
        }
    }

    /// Runs a whole training attempt.
    ///
    /// When a timeout is configured and exceeded the attempt is reported as `TimedOut`, the
    /// blocking computation is left to finish on its own and its result is dropped. `hold` lives
    /// as long as that computation, not as long as this future.
    ///
    /// # Arguments
    /// * `job` - The job this attempt belongs to.
    /// * `texts` - The documents of the dataset.
    /// * `labels` - The label of each document.
    /// * `hold` - Dropped once the blocking computation returns.
    ///
    /// # Returns
    /// The new artifact, carrying a `Ready` status with its evaluation, or the cause of the
    /// failure.
    pub async fn run<H: Send + 'static>(
        &self,
        job: &TrainingJob,
        texts: Vec<String>,
        labels: Vec<String>,
        hold: H,
    ) -> Result<Artifact<E::Model>> {
        let start = Instant::now();
        let estimator = Arc::clone(&self.estimator);
        let config = self.config.clone();

        let task = task::spawn_blocking(move || {
            let attempt = Self::fit_and_evaluate(&estimator, &config, &texts, &labels);
            drop(hold);
            attempt
        });

        let joined = match self.config.timeout {
            Some(limit) => time::timeout(limit, task)
                .await
                .map_err(|_| ModelErr::TimedOut(limit))?,
            None => task.await,
        };

        let artifact = joined.map_err(|e| ModelErr::TrainingAborted(e.to_string()))??;

        info!(
            job = job.id.get(),
            elapsed_ms = start.elapsed().as_millis() as u64;
            "training finished"
        );

        Ok(artifact)
    }

    fn fit_and_evaluate(
        estimator: &E,
        config: &TrainingConfig,
        texts: &[String],
        labels: &[String],
    ) -> Result<Artifact<E::Model>> {
        let split = train_test_split(texts, labels, config.test_size, config.seed)
            .map_err(ModelErr::Split)?;

        debug!(
            train = split.train_len(),
            test = split.test_len();
            "split dataset"
        );

        let model = estimator
            .fit(&split.train_texts, &split.train_labels)
            .map_err(ModelErr::Fit)?;

        let predicted = model.predict(&split.test_texts).map_err(ModelErr::Fit)?;
        let evaluation = ClassificationReport::new(&split.test_labels, &predicted).into_evaluation();

        let status = ModelStatus::ready(model.classes().to_vec(), evaluation);
        Ok(Artifact::new(model, status))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use machine_learning::{MlErr, TextPipeline};

    use super::*;
    use crate::training::JobId;

    fn strings(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn job() -> TrainingJob {
        TrainingJob::new(JobId::next())
    }

    #[tokio::test]
    async fn test_run_produces_a_ready_artifact() {
        let runner = TrainingRunner::new(
            TextPipeline::default(),
            TrainingConfig {
                test_size: 0.5,
                seed: Some(7),
                ..Default::default()
            },
        );

        let texts = strings(&["good product", "bad product", "great", "terrible"]);
        let labels = strings(&["pos", "neg", "pos", "neg"]);
        let artifact = runner.run(&job(), texts, labels, ()).await.unwrap();

        assert!(artifact.status.is_ready());
        assert_eq!(artifact.classes(), ["neg", "pos"]);
        assert!(artifact.status.evaluation.contains_key("accuracy"));
    }

    #[tokio::test]
    async fn test_unsplittable_dataset() {
        let runner = TrainingRunner::new(TextPipeline::default(), TrainingConfig::default());

        let err = runner
            .run(&job(), strings(&["a", "b", "c"]), strings(&["x", "x", "y"]), ())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ModelErr::Split(MlErr::UnsplittableClass { .. })
        ));
    }

    struct Sleepy;

    impl Estimator for Sleepy {
        type Model = machine_learning::TextClassifier;

        fn fit(
            &self,
            texts: &[String],
            labels: &[String],
        ) -> machine_learning::Result<Self::Model> {
            std::thread::sleep(Duration::from_millis(300));
            TextPipeline::default().fit(texts, labels)
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let limit = Duration::from_millis(20);
        let runner = TrainingRunner::new(
            Sleepy,
            TrainingConfig {
                timeout: Some(limit),
                ..Default::default()
            },
        );

        let texts = strings(&["good", "bad", "great", "awful"]);
        let labels = strings(&["pos", "neg", "pos", "neg"]);
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        let err = runner.run(&job(), texts, labels, done_tx).await.unwrap_err();

        assert!(matches!(err, ModelErr::TimedOut(l) if l == limit));

        // the fit is still running, its hold is only released when it returns
        assert_eq!(
            done_rx.try_recv(),
            Err(std::sync::mpsc::TryRecvError::Empty)
        );
        let released = task::spawn_blocking(move || done_rx.recv()).await.unwrap();
        assert!(released.is_err());
    }
}
