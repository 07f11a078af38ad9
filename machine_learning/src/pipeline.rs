use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{
    MlErr, Result,
    estimator::{Classifier, Estimator},
    linear::{LogRegConfig, LogRegModel, LogisticRegression},
    text::{Tfidf, TfidfConfig, TfidfVectorizer},
};

/// Hyperparameters of a `TextPipeline`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub tfidf: TfidfConfig,
    pub logreg: LogRegConfig,
}

/// TF-IDF features followed by a logistic regression.
#[derive(Debug, Clone, Default)]
pub struct TextPipeline {
    config: PipelineConfig,
}

impl TextPipeline {
    /// Creates a new `TextPipeline`.
    ///
    /// # Arguments
    /// * `config` - The pipeline's hyperparameters.
    ///
    /// # Returns
    /// A new `TextPipeline` instance.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}

impl Estimator for TextPipeline {
    type Model = TextClassifier;

    fn fit(&self, texts: &[String], labels: &[String]) -> Result<TextClassifier> {
        if texts.len() != labels.len() {
            return Err(MlErr::SizeMismatch {
                a: "texts",
                b: "labels",
                got: texts.len(),
                expected: labels.len(),
            });
        }

        let tfidf = TfidfVectorizer::new(self.config.tfidf.clone()).fit(texts)?;
        let rows = tfidf.transform(texts);
        let model = LogisticRegression::new(self.config.logreg.clone()).fit(
            &rows,
            labels,
            tfidf.len(),
        )?;

        Ok(TextClassifier { tfidf, model })
    }
}

/// A fitted `TextPipeline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextClassifier {
    tfidf: Tfidf,
    model: LogRegModel,
}

impl Classifier for TextClassifier {
    fn classes(&self) -> &[String] {
        self.model.classes()
    }

    fn predict_proba(&self, texts: &[String]) -> Result<Array2<f32>> {
        let rows = self.tfidf.transform(texts);
        Ok(self.model.predict_proba(&rows))
    }
}
