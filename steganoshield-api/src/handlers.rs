use std::sync::Arc;

use analyzers::{ClassificationRequest, ClassificationResult, ModelBackend};
use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};
use tracing::Instrument;
use uuid::Uuid;

use crate::action::classify_image_action;
use crate::error::ApiError;
use crate::models::{AppState, ServiceInfo};

pub async fn root<B: ModelBackend + 'static>(
    State(state): State<Arc<AppState<B>>>,
) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "SteganoShield API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Simulated steganography and malware-artifact classification for images"
            .to_string(),
        backend: state.invoker.backend().name().to_string(),
        endpoint: "POST /api/classify".to_string(),
    })
}

pub async fn classify_image<B: ModelBackend + 'static>(
    State(state): State<Arc<AppState<B>>>,
    payload: Result<Json<ClassificationRequest>, JsonRejection>,
) -> Result<Json<ClassificationResult>, ApiError> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("classify", %request_id);

    async move {
        tracing::info!("Classifying image ({} bytes of data URI)", request.image_data.len());
        let result = classify_image_action(&state.invoker, &state.prompt, &request).await?;
        tracing::info!("Classification completed: {}", result.classification);
        Ok::<_, ApiError>(Json(result))
    }
    .instrument(span)
    .await
}
