use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::core::RosterError;
use crate::export::ExportError;

use super::error_response;

pub(crate) const EXPORT_FAILED_MESSAGE: &str = "Failed to export snapshot. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid API JSON payload: {}", .0.body_text())]
    Payload(#[from] JsonRejection),
    #[error(transparent)]
    Roster(#[from] RosterError),
    #[error("sign in required")]
    Unauthorized,
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
            ApiError::Payload(rejection) => error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid API JSON payload: {}", rejection.body_text()),
            ),
            ApiError::Roster(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
            ApiError::Unauthorized => {
                error_response(StatusCode::UNAUTHORIZED, "sign in required")
            }
            ApiError::Export(err) => {
                tracing::error!(error = ?err, "snapshot export failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, EXPORT_FAILED_MESSAGE)
            }
        }
    }
}
