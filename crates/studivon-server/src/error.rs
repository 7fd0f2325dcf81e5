//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

use studivon_core::error::StudivonError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INT_001", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = %self.code, "{}", self.message);
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

fn status_for(err: &StudivonError) -> StatusCode {
    match err {
        StudivonError::NotFound { .. } => StatusCode::NOT_FOUND,
        StudivonError::Validation { .. } | StudivonError::Parse { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StudivonError::Conflict { .. } => StatusCode::CONFLICT,
        StudivonError::RateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
        StudivonError::Advisor { .. } => StatusCode::BAD_GATEWAY,
        StudivonError::Database { .. }
        | StudivonError::Configuration(_)
        | StudivonError::Io(_)
        | StudivonError::Serialization(_)
        | StudivonError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// Convert from studivon-core errors
impl From<StudivonError> for ApiError {
    fn from(err: StudivonError) -> Self {
        let status = status_for(&err);
        let code = err.code().as_str();
        let suggestion = err.suggestion().map(str::to_string);

        let mut details = serde_json::Map::new();
        match &err {
            StudivonError::Validation { details: fields, .. } => {
                for (k, v) in fields {
                    details.insert(k.clone(), serde_json::Value::String(v.clone()));
                }
            }
            StudivonError::NotFound {
                task_id: Some(id), ..
            }
            | StudivonError::Conflict {
                task_id: Some(id), ..
            } => {
                details.insert("taskId".to_string(), serde_json::Value::String(id.clone()));
            }
            StudivonError::RateLimit {
                retry_after: Some(secs),
                ..
            } => {
                details.insert("retryAfter".to_string(), serde_json::Value::from(*secs));
            }
            _ => {}
        }
        if let Some(suggestion) = suggestion {
            details.insert("suggestion".to_string(), serde_json::Value::String(suggestion));
        }

        let api = ApiError::new(status, code, err.to_string());
        if details.is_empty() {
            api
        } else {
            api.with_details(serde_json::Value::Object(details))
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StudivonError::not_found("t1"), StatusCode::NOT_FOUND),
            (StudivonError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (StudivonError::already_completed("t1"), StatusCode::CONFLICT),
            (StudivonError::rate_limit("slow down"), StatusCode::TOO_MANY_REQUESTS),
            (StudivonError::database("locked"), StatusCode::INTERNAL_SERVER_ERROR),
            (StudivonError::Internal("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_details_carry_task_id_and_code() {
        let api = ApiError::from(StudivonError::not_found("abc"));
        assert_eq!(api.code, "TASK_001");
        let details = api.details.unwrap();
        assert_eq!(details["taskId"], "abc");
    }
}
