#![cfg(test)]

use crate::{
    Classifier, ClassificationReport, Estimator, PipelineConfig, TextClassifier, TextPipeline,
    train_test_split,
};

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn reviews() -> (Vec<String>, Vec<String>) {
    let texts = strings(&[
        "great product, works perfectly",
        "excellent quality and great value",
        "love it, great purchase",
        "perfect, excellent service",
        "terrible product, broke after a day",
        "awful quality, total waste of money",
        "bad purchase, terrible service",
        "broke immediately, awful",
    ]);
    let labels = strings(&["pos", "pos", "pos", "pos", "neg", "neg", "neg", "neg"]);
    (texts, labels)
}

#[test]
fn test_pipeline_tiny_scenario() {
    let texts = strings(&["good product", "bad product", "great", "terrible"]);
    let labels = strings(&["pos", "neg", "pos", "neg"]);

    let model = TextPipeline::default().fit(&texts, &labels).unwrap();
    assert_eq!(model.classes(), ["neg", "pos"]);

    let proba = model.predict_proba(&strings(&["excellent"])).unwrap();
    assert_eq!(proba.dim(), (1, 2));
    assert!((proba.sum() - 1.0).abs() < 1e-5);
}

#[test]
fn test_pipeline_learns_sentiment() {
    let (texts, labels) = reviews();
    let model = TextPipeline::default().fit(&texts, &labels).unwrap();

    let predicted = model
        .predict(&strings(&["great value", "terrible, awful"]))
        .unwrap();
    assert_eq!(predicted, ["pos", "neg"]);
}

#[test]
fn test_pipeline_split_fit_evaluate() {
    let (texts, labels) = reviews();
    let split = train_test_split(&texts, &labels, 0.25, Some(3)).unwrap();

    let model = TextPipeline::new(PipelineConfig::default())
        .fit(&split.train_texts, &split.train_labels)
        .unwrap();
    let predicted = model.predict(&split.test_texts).unwrap();
    let report = ClassificationReport::new(&split.test_labels, &predicted);

    assert_eq!(report.per_class.len(), 2);
    assert_eq!(report.macro_avg.support, split.test_len());
    assert!((0.0..=1.0).contains(&report.accuracy));
}

#[test]
fn test_serialized_model_predicts_the_same() {
    let (texts, labels) = reviews();
    let model = TextPipeline::default().fit(&texts, &labels).unwrap();

    let bytes = serde_json::to_vec(&model).unwrap();
    let restored: TextClassifier = serde_json::from_slice(&bytes).unwrap();

    let probe = strings(&["great", "awful service", ""]);
    assert_eq!(
        model.predict_proba(&probe).unwrap(),
        restored.predict_proba(&probe).unwrap()
    );
    assert_eq!(restored, model);
}

#[test]
fn test_fit_is_deterministic() {
    let (texts, labels) = reviews();
    let one = TextPipeline::default().fit(&texts, &labels).unwrap();
    let two = TextPipeline::default().fit(&texts, &labels).unwrap();
    assert_eq!(one, two);
}
