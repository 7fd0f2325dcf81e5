//! Read-only analytics endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use studivon_core::cognitive::{
    Dossier, PredictiveInsight, StrategyProfile, SubjectMastery, TrendReport, WeeklyReport,
};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MasteryResponse {
    pub message: String,
    pub data: Vec<SubjectMastery>,
}

/// Mastery per subject, weakest first.
/// GET /api/tasks/mastery
pub async fn mastery(State(state): State<AppState>) -> ApiResult<Json<MasteryResponse>> {
    let data = state.engine.mastery_report().await?;
    Ok(Json(MasteryResponse {
        message: "Mastery report generated.".to_string(),
        data,
    }))
}

/// GET /api/tasks/predict/:subject
pub async fn predict(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> ApiResult<Json<PredictiveInsight>> {
    Ok(Json(state.engine.predictive_insight(&subject).await?))
}

/// GET /api/tasks/strategy
pub async fn strategy(State(state): State<AppState>) -> ApiResult<Json<StrategyProfile>> {
    Ok(Json(state.engine.user_strategy().await?))
}

/// GET /api/tasks/trends
pub async fn trends(State(state): State<AppState>) -> ApiResult<Json<TrendReport>> {
    Ok(Json(state.engine.trend_analysis().await?))
}

/// GET /api/tasks/weekly-report
pub async fn weekly_report(State(state): State<AppState>) -> ApiResult<Json<WeeklyReport>> {
    Ok(Json(state.engine.weekly_report().await?))
}

/// GET /api/tasks/dossier
pub async fn dossier(State(state): State<AppState>) -> ApiResult<Json<Dossier>> {
    Ok(Json(state.engine.dossier().await?))
}
