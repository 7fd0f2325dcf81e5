//! Liveness plus a cheap storage probe.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use studivon_core::traits::TaskRepository;
use studivon_core::types::TaskFilter;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `healthy`, or `degraded` when the task store cannot be read.
    pub status: &'static str,
    pub storage: &'static str,
    /// Model behind the coach; `offline` when no provider key is configured.
    pub advisor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_tasks: Option<usize>,
    pub version: &'static str,
}

/// GET /health
///
/// Answers 503 when the pending-task count fails, so an orchestrator can tell
/// a broken database apart from a dead process.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pending = state
        .engine
        .repository()
        .count_tasks(&TaskFilter::pending())
        .await;

    let (code, status, pending_tasks) = match pending {
        Ok(count) => (StatusCode::OK, "healthy", Some(count)),
        Err(e) => {
            tracing::error!(storage = state.storage, "Task store probe failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", None)
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            storage: state.storage,
            advisor: state.coach.model_name().to_string(),
            pending_tasks,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
