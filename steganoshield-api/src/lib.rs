pub mod action;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use analyzers::ModelBackend;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

// Re-export key types
pub use action::{ActionError, ErrorGuidance, classify_image_action};
pub use config::{BackendKind, ServerConfig};
pub use error::ApiError;
pub use models::*;

pub fn router<B: ModelBackend + 'static>(state: Arc<AppState<B>>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::root::<B>))
        .route("/api/classify", post(handlers::classify_image::<B>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(state)
}
