//! Route definitions for the REST API.

mod analytics;
mod coach;
mod health;
mod tasks;

use axum::{
    http::{StatusCode, Uri},
    routing::{get, post, put},
    Router,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let tasks = Router::new()
        // Task lifecycle
        .route("/add", post(tasks::add_task))
        .route("/pending", get(tasks::pending_tasks))
        .route("/task/:id", get(tasks::get_task))
        .route("/complete/:id", put(tasks::complete_task))
        .route("/missed/:id", put(tasks::mark_missed))
        // Analytics
        .route("/mastery", get(analytics::mastery))
        .route("/predict/:subject", get(analytics::predict))
        .route("/strategy", get(analytics::strategy))
        .route("/trends", get(analytics::trends))
        .route("/weekly-report", get(analytics::weekly_report))
        .route("/dossier", get(analytics::dossier))
        // Coaching
        .route("/coach-advice", post(coach::coach_advice))
        .route("/strategy-coach", post(coach::strategy_coach));

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .nest("/api/tasks", tasks)
        // Attach state
        .with_state(state)
}

/// JSON 404 for paths outside the API.
pub async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        "ROUTE_001",
        format!("No route for {}", uri.path()),
    )
}

pub use analytics::*;
pub use coach::*;
pub use health::*;
pub use tasks::*;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use studivon_core::clock::FixedClock;
    use studivon_core::config::{CoachRetryPolicy, EngineConfig};
    use studivon_core::store::InMemoryTaskRepository;
    use studivon_llm::OfflineAdvisor;
    use tower::ServiceExt;

    fn state() -> AppState {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap());
        AppState::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(clock),
            Arc::new(OfflineAdvisor::new()),
            EngineConfig::default(),
            CoachRetryPolicy::default(),
        )
    }

    fn app() -> Router {
        create_router(state())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["storage"], "memory");
        assert_eq!(body["advisor"], "offline");
        assert_eq!(body["pendingTasks"], 0);

        send(
            &app,
            Method::POST,
            "/api/tasks/add",
            Some(json!({ "title": "Essay", "subject": "History", "deadline": "2025-03-12" })),
        )
        .await;
        let (_, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(body["pendingTasks"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_not_found() {
        let app = crate::create_server(state());
        let (status, body) = send(&app, Method::GET, "/api/tasks/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "ROUTE_001");
    }

    #[tokio::test]
    async fn test_add_complete_and_conflict() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/tasks/add",
            Some(json!({
                "title": "Limits",
                "subject": "Calculus",
                "difficulty": 4,
                "deadline": "2025-03-12",
                "estimatedMinutes": 60
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Intelligence applied.");
        assert_eq!(body["priorityScore"], 150);
        let id = body["taskId"].as_str().unwrap().to_string();

        let uri = format!("/api/tasks/complete/{}", id);
        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "actualMinutes": 30 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["efficiencyScore"], 2.0);
        assert_eq!(body["focusDetected"], "Early Bird");
        assert_eq!(body["spacedRepetition"]["intervalDays"], 2);

        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "actualMinutes": 30 }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "TASK_002");

        let (_, pending) = send(&app, Method::GET, "/api/tasks/pending", None).await;
        assert_eq!(pending.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_deadline_is_unprocessable() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/tasks/add",
            Some(json!({ "title": "Essay", "subject": "History", "deadline": "someday" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VAL_003");
    }

    #[tokio::test]
    async fn test_unknown_task_is_not_found() {
        let app = app();
        let (status, body) = send(&app, Method::PUT, "/api/tasks/missed/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["details"]["taskId"], "nope");
    }

    #[tokio::test]
    async fn test_insufficient_data_is_success() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/tasks/predict/Physics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "InsufficientData");
        assert_eq!(body["prediction"], "Initializing...");

        let (status, body) = send(&app, Method::GET, "/api/tasks/weekly-report", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_coach_routes() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/tasks/coach-advice",
            Some(json!({ "goal": "MCAT", "trends": { "status": "Declining" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["advice"].as_str().unwrap().contains("MCAT"));

        let (status, body) = send(&app, Method::POST, "/api/tasks/strategy-coach", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["strategyAdvice"].as_str().unwrap().starts_with("Day 1:"));
    }
}
