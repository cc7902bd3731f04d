//! Liveness endpoint.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /api/health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running!",
        timestamp: chrono::Utc::now(),
        version: folio_core::version(),
        environment: state.config.environment.as_str(),
    })
}
