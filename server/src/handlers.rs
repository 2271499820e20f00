use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use incident_core::Incident;
use tracing::debug;
use tracing::warn;

use crate::AppState;
use crate::error::ApiError;

/// `POST /ingest`. The body is decoded by the pipeline so that every
/// malformed payload maps to the same client error.
pub(crate) async fn ingest(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Incident>, ApiError> {
    let incident = state.pipeline.ingest_json(&body).await?;
    Ok(Json(incident))
}

/// `GET /incidents`, newest first.
pub(crate) async fn list_incidents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Incident>>, ApiError> {
    let incidents = state.pipeline.list().await?;
    debug!(op = "incidents.list", count = incidents.len());
    Ok(Json(incidents))
}

/// `GET /healthz`.
pub(crate) async fn healthz(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.pipeline.store().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            warn!(op = "healthz", "store ping failed: {err}");
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}
