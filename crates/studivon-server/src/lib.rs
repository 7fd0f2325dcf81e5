//! studivon-server - HTTP front end for the study engine.
//!
//! Everything learner-facing lives under `/api/tasks`. `/health` also probes
//! the task store and reports the pending backlog.
//!
//! # Example
//!
//! ```ignore
//! use studivon_core::StudivonConfig;
//! use studivon_server::{create_server, create_state};
//!
//! #[tokio::main]
//! async fn main() {
//!     let state = create_state(&StudivonConfig::from_env()).unwrap();
//!     let app = create_server(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod factory;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use factory::{create_repository, create_state};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Build the HTTP app. Unknown paths answer with the API's JSON error body.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .fallback(routes::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
