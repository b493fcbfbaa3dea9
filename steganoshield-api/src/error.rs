use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::action::ActionError;
use crate::models::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request body: {0}")]
    InvalidRequest(#[from] JsonRejection),

    #[error(transparent)]
    AnalysisFailed(#[from] ActionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(rejection) => rejection.status(),
            ApiError::AnalysisFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = Json(ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
        });

        (status, body).into_response()
    }
}
