//! HTTP front end of the text classification trainer.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use machine_learning::TextPipeline;
use model_server::{ModelManager, storage::Store};
use tower_http::cors::{Any, CorsLayer};

pub use config::AppConfig;
pub use error::ApiError;

/// The model manager served by the api.
pub type Manager<S> = ModelManager<TextPipeline, S>;

/// Application state shared across handlers.
pub struct AppState<S: Store> {
    pub manager: Manager<S>,
    pub app_name: Arc<str>,
    pub version: Arc<str>,
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            app_name: Arc::clone(&self.app_name),
            version: Arc::clone(&self.version),
        }
    }
}

impl<S: Store> AppState<S> {
    pub fn new(manager: Manager<S>, config: &AppConfig) -> Self {
        Self {
            manager,
            app_name: config.app_name.as_str().into(),
            version: config.version.as_str().into(),
        }
    }
}

/// Builds the api's router, every route requires the `X-API-Key` header to equal `api_key`.
///
/// # Arguments
/// * `state` - The shared application state.
/// * `api_key` - The secret clients must present.
pub fn router<S: Store>(state: AppState<S>, api_key: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::home::<S>))
        .route("/status", get(routes::status::<S>))
        .route("/train", post(routes::train::<S>))
        .route("/predict", post(routes::predict::<S>))
        .route("/predict-batch", post(routes::predict_batch::<S>))
        .route_layer(middleware::from_fn_with_state(
            Arc::<str>::from(api_key),
            auth::require_api_key,
        ))
        .layer(cors)
        .with_state(state)
}
