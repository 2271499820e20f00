use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use incident_core::IngestError;
use incident_core::StoreError;
use thiserror::Error;
use tracing::error;
use tracing::warn;

/// Per-request failure, rendered as a status code with a plain-text body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ingest(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Ingest(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        if status.is_server_error() {
            error!(status = status.as_u16(), "{message}");
        } else {
            warn!(status = status.as_u16(), "{message}");
        }
        (status, message).into_response()
    }
}
