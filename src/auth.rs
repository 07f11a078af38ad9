use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Rejects every request whose `X-API-Key` header doesn't match `key`.
pub async fn require_api_key(
    State(key): State<Arc<str>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let given = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if given != Some(&*key) {
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(req).await)
}
