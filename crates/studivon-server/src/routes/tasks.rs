//! Task lifecycle endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use studivon_core::engine::{parse_deadline, CompletionOutcome, CreatedTask, MissOutcome};
use studivon_core::error::StudivonError;
use studivon_core::types::{NewTask, Task, TaskType, DEFAULT_DIFFICULTY};

use crate::error::ApiResult;
use crate::state::AppState;

/// Request body for adding a task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subject: String,
    pub difficulty: Option<i64>,
    /// RFC 3339 or `YYYY-MM-DD`.
    pub deadline: Option<String>,
    pub estimated_minutes: Option<i64>,
    pub task_type: Option<TaskType>,
}

#[derive(Debug, Serialize)]
pub struct AddTaskResponse {
    pub message: String,
    #[serde(flatten)]
    pub task: CreatedTask,
}

/// Add a task.
/// POST /api/tasks/add
pub async fn add_task(
    State(state): State<AppState>,
    Json(request): Json<AddTaskRequest>,
) -> ApiResult<(StatusCode, Json<AddTaskResponse>)> {
    let raw_deadline = request
        .deadline
        .ok_or_else(|| StudivonError::missing_field("deadline"))?;
    let input = NewTask {
        title: request.title,
        subject: request.subject,
        difficulty: request.difficulty.unwrap_or(DEFAULT_DIFFICULTY as i64),
        deadline: parse_deadline(&raw_deadline)?,
        estimated_minutes: request.estimated_minutes,
        task_type: request.task_type,
    };

    let task = state.engine.create_task(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(AddTaskResponse {
            message: "Intelligence applied.".to_string(),
            task,
        }),
    ))
}

/// Request body for completing a task.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTaskRequest {
    pub actual_minutes: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CompleteTaskResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: CompletionOutcome,
}

/// Complete a task.
/// PUT /api/tasks/complete/:id
pub async fn complete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CompleteTaskRequest>,
) -> ApiResult<Json<CompleteTaskResponse>> {
    let minutes = request
        .actual_minutes
        .ok_or_else(|| StudivonError::missing_field("actualMinutes"))?;
    let outcome = state.engine.complete_task(&id, minutes).await?;
    Ok(Json(CompleteTaskResponse {
        message: "Task completed!".to_string(),
        outcome,
    }))
}

#[derive(Debug, Serialize)]
pub struct MissTaskResponse {
    pub message: String,
    #[serde(flatten)]
    pub outcome: MissOutcome,
}

/// Mark a task missed.
/// PUT /api/tasks/missed/:id
pub async fn mark_missed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MissTaskResponse>> {
    let outcome = state.engine.miss_task(&id).await?;
    Ok(Json(MissTaskResponse {
        message: "Task marked missed. Priority boosted for recovery.".to_string(),
        outcome,
    }))
}

/// Get one task.
/// GET /api/tasks/task/:id
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Task>> {
    Ok(Json(state.engine.get_task(&id).await?))
}

/// Pending tasks, highest priority first.
/// GET /api/tasks/pending
pub async fn pending_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.engine.pending_tasks().await?))
}
