// src/handlers/health.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{error::AppError, state::AppState};

/// Reports backend health and which persistence backend is serving.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let backend = state.store.backend_name();
    let reachable = state.store.ping().await;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "database_connected": backend == "postgres" && reachable,
        "storage_backend": backend,
        "message": "Backend is running",
    })))
}
