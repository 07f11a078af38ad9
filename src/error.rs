use std::fmt;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use model_server::ModelErr;
use serde_json::json;

pub const UNAUTHORIZED: &str = "You are not authorized to use this API";

/// Failures of a request, rendered as `{"detail": message}`.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    InvalidInput(String),
    Internal(String),
    Model(ModelErr),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Model(e) => match e {
                ModelErr::AlreadyTraining => StatusCode::CONFLICT,
                ModelErr::NoModel => StatusCode::SERVICE_UNAVAILABLE,
                ModelErr::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => f.write_str(UNAUTHORIZED),
            Self::InvalidInput(msg) | Self::Internal(msg) => f.write_str(msg),
            Self::Model(e) => write!(f, "{e}"),
        }
    }
}

impl From<ModelErr> for ApiError {
    fn from(e: ModelErr) -> Self {
        Self::Model(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("request failed: {self}");
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Unauthorized, StatusCode::FORBIDDEN),
            (ApiError::InvalidInput("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ModelErr::AlreadyTraining.into(), StatusCode::CONFLICT),
            (ModelErr::NoModel.into(), StatusCode::SERVICE_UNAVAILABLE),
            (ModelErr::InvalidInput("x".into()).into(), StatusCode::UNPROCESSABLE_ENTITY),
            (ModelErr::TimedOut(Duration::from_secs(1)).into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }

    #[tokio::test]
    async fn test_detail_body() {
        let res = ApiError::from(ModelErr::AlreadyTraining).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["detail"],
            "A training process is already running, please wait"
        );
    }
}
