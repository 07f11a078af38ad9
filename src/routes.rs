//! Request handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use log::info;
use model_server::{ModelStatus, Prediction, storage::Store};
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::{AppState, error::ApiError};

type Payload<T> = Result<Json<T>, JsonRejection>;

/// A training label, integers are accepted and read as their decimal text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Text(String),
    Number(i64),
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        match label {
            Label::Text(text) => text,
            Label::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub texts: Vec<String>,
    pub labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub texts: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct AppInfo {
    pub app_name: String,
    pub version: String,
}

/// A `ModelStatus` along with its human readable state.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(flatten)]
    pub model: ModelStatus,
}

impl From<ModelStatus> for StatusResponse {
    fn from(model: ModelStatus) -> Self {
        Self {
            status: model.state.to_string(),
            model,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub predictions: Vec<Prediction>,
}

pub async fn home<S: Store>(State(state): State<AppState<S>>) -> Json<AppInfo> {
    Json(AppInfo {
        app_name: state.app_name.to_string(),
        version: state.version.to_string(),
    })
}

pub async fn status<S: Store>(State(state): State<AppState<S>>) -> Json<StatusResponse> {
    Json(state.manager.status().into())
}

/// Starts a background training job and answers with its `Training` status.
pub async fn train<S: Store>(
    State(state): State<AppState<S>>,
    payload: Payload<TrainRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    let Json(req) = payload?;
    let labels = req.labels.into_iter().map(String::from).collect();

    let handle = state.manager.start_training(req.texts, labels).await?;
    info!(job = handle.job().id.get(); "accepted training request");

    Ok((StatusCode::ACCEPTED, Json(handle.started().clone().into())))
}

pub async fn predict<S: Store>(
    State(state): State<AppState<S>>,
    payload: Payload<PredictRequest>,
) -> Result<Json<Prediction>, ApiError> {
    let Json(req) = payload?;
    let text = req
        .text
        .ok_or_else(|| ApiError::InvalidInput("missing field `text`".into()))?;

    predict_all(&state, vec![text])
        .await?
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::Internal("the model returned no prediction".into()))
}

pub async fn predict_batch<S: Store>(
    State(state): State<AppState<S>>,
    payload: Payload<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(req) = payload?;
    let texts = req
        .texts
        .ok_or_else(|| ApiError::InvalidInput("missing field `texts`".into()))?;

    let predictions = predict_all(&state, texts).await?;
    Ok(Json(BatchResponse { predictions }))
}

/// Runs the cpu bound prediction on tokio's blocking pool.
async fn predict_all<S: Store>(
    state: &AppState<S>,
    texts: Vec<String>,
) -> Result<Vec<Prediction>, ApiError> {
    let manager = state.manager.clone();

    let predictions = task::spawn_blocking(move || manager.predict(&texts))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(predictions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_accept_strings_and_integers() {
        let req: TrainRequest =
            serde_json::from_str(r#"{"texts": ["a", "b"], "labels": ["spam", 3]}"#).unwrap();

        let labels: Vec<String> = req.labels.into_iter().map(String::from).collect();
        assert_eq!(labels, ["spam", "3"]);
    }

    #[test]
    fn test_status_response_shape() {
        let json = serde_json::to_value(StatusResponse::from(ModelStatus::no_model())).unwrap();

        assert_eq!(json["status"], "No Model Found");
        assert_eq!(json["state"], "no_model");
    }
}
