//! Errors surfaced by the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::types::ErrorResponse;
use crate::agent::ConversationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Se requieren tanto la marca como el objetivo")]
    MissingFields,

    #[error("No se pudo generar la estrategia")]
    EmptyStrategy,

    #[error("Error en el procesamiento de la solicitud")]
    Processing(#[from] ConversationError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields => StatusCode::BAD_REQUEST,
            ApiError::EmptyStrategy | ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::MissingFields => tracing::debug!("Rejected analysis request without brand or goal"),
            ApiError::EmptyStrategy => tracing::warn!("No content was generated for the strategy"),
            ApiError::Processing(cause) => tracing::error!(error = %cause, "Analysis failed"),
        }

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
