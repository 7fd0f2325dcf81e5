//! Coaching endpoints.
//!
//! Clients may post the signals they already fetched. When a request carries
//! no signals at all, they are assembled from the learner's history.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use studivon_core::traits::{
    AdviceKind, CoachingContext, PredictionSignals, StrategySignals, TrendSignals,
};

use crate::error::ApiResult;
use crate::state::AppState;

/// Coaching request body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachRequest {
    #[serde(flatten)]
    pub context: CoachingContext,
    /// Subject to forecast when signals are assembled server-side.
    pub subject: Option<String>,
}

impl CoachRequest {
    fn has_signals(&self) -> bool {
        self.context.strategy != StrategySignals::default()
            || self.context.prediction != PredictionSignals::default()
            || self.context.trend != TrendSignals::default()
    }
}

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub advice: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAdviceResponse {
    pub strategy_advice: String,
}

async fn advise(state: &AppState, request: CoachRequest, kind: AdviceKind) -> ApiResult<String> {
    let context = if request.has_signals() {
        CoachingContext {
            kind,
            ..request.context
        }
    } else {
        tracing::debug!(%kind, "No coaching signals posted; assembling from history");
        state
            .engine
            .coaching_context(kind, request.context.goal, request.subject.as_deref())
            .await?
    };
    Ok(state.coach.advise(&context).await?)
}

/// Daily coaching nudge.
/// POST /api/tasks/coach-advice
pub async fn coach_advice(
    State(state): State<AppState>,
    request: Option<Json<CoachRequest>>,
) -> ApiResult<Json<AdviceResponse>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let advice = advise(&state, request, AdviceKind::Daily).await?;
    Ok(Json(AdviceResponse { advice }))
}

/// Three-day strategy session.
/// POST /api/tasks/strategy-coach
pub async fn strategy_coach(
    State(state): State<AppState>,
    request: Option<Json<CoachRequest>>,
) -> ApiResult<Json<StrategyAdviceResponse>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let strategy_advice = advise(&state, request, AdviceKind::StrategySession).await?;
    Ok(Json(StrategyAdviceResponse { strategy_advice }))
}
