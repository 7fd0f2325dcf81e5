//! Error types for studivon operations.
//!
//! Every failure carries a stable [`ErrorCode`] so the transport layer can map
//! it without string matching. Missing history is deliberately absent here:
//! forecasts report it as a response variant, not as an error.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for studivon operations.
pub type StudivonResult<T> = Result<T, StudivonError>;

/// Main error type for all studivon operations.
#[derive(Error, Debug)]
pub enum StudivonError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Task not found.
    #[error("Task not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        task_id: Option<String>,
    },

    /// The requested status transition is not allowed from the current status.
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        code: ErrorCode,
        task_id: Option<String>,
    },

    /// Upstream rate limit exceeded (transient).
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        code: ErrorCode,
        retry_after: Option<u64>,
    },

    /// Coaching text generation failed (non-transient).
    #[error("Advisor error: {message}")]
    Advisor {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Repository operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parse error.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,
    ValInvalidDate,

    // Task (TASK_xxx)
    TaskNotFound,
    TaskAlreadyCompleted,
    TaskInvalidTransition,

    // Rate Limit (RATE_xxx)
    RateLimitExceeded,

    // Advisor (ADV_xxx)
    AdvConnectionFailed,
    AdvGenerationFailed,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseInvalidValue,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ValInvalidDate => "VAL_003",
            ErrorCode::TaskNotFound => "TASK_001",
            ErrorCode::TaskAlreadyCompleted => "TASK_002",
            ErrorCode::TaskInvalidTransition => "TASK_003",
            ErrorCode::RateLimitExceeded => "RATE_001",
            ErrorCode::AdvConnectionFailed => "ADV_001",
            ErrorCode::AdvGenerationFailed => "ADV_002",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseInvalidValue => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl StudivonError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error for a missing required field.
    pub fn missing_field(field: &str) -> Self {
        let mut details = HashMap::new();
        details.insert("field".to_string(), field.to_string());
        Self::Validation {
            message: format!("Missing required field '{}'", field),
            code: ErrorCode::ValMissingField,
            details,
            suggestion: None,
        }
    }

    /// Create a validation error for an unparseable date.
    pub fn invalid_date(raw: &str) -> Self {
        let mut details = HashMap::new();
        details.insert("value".to_string(), raw.to_string());
        Self::Validation {
            message: format!("Unparseable date '{}'", raw),
            code: ErrorCode::ValInvalidDate,
            details,
            suggestion: Some("Use RFC 3339 (2025-03-01T09:00:00Z) or YYYY-MM-DD".to_string()),
        }
    }

    /// Create a not found error.
    pub fn not_found(task_id: impl Into<String>) -> Self {
        let id = task_id.into();
        Self::NotFound {
            message: format!("Task with id '{}' not found", id),
            code: ErrorCode::TaskNotFound,
            task_id: Some(id),
        }
    }

    /// Create a conflict error for a task that is already completed.
    pub fn already_completed(task_id: impl Into<String>) -> Self {
        let id = task_id.into();
        Self::Conflict {
            message: format!("Task '{}' is already completed", id),
            code: ErrorCode::TaskAlreadyCompleted,
            task_id: Some(id),
        }
    }

    /// Create a conflict error for any other illegal status transition.
    pub fn invalid_transition(task_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
            code: ErrorCode::TaskInvalidTransition,
            task_id: Some(task_id.into()),
        }
    }

    /// Create a rate limit error.
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
            code: ErrorCode::RateLimitExceeded,
            retry_after: None,
        }
    }

    /// Create an advisor error.
    pub fn advisor(message: impl Into<String>) -> Self {
        Self::Advisor {
            message: message.into(),
            code: ErrorCode::AdvGenerationFailed,
            source: None,
        }
    }

    /// Create an advisor connection error.
    pub fn advisor_connection(message: impl Into<String>) -> Self {
        Self::Advisor {
            message: message.into(),
            code: ErrorCode::AdvConnectionFailed,
            source: None,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidValue,
        }
    }

    /// Whether the failure is transient and worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Conflict { code, .. } => *code,
            Self::RateLimit { code, .. } => *code,
            Self::Advisor { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Serialization(_) => ErrorCode::ParseInvalidJson,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::NotFound { .. } => Some("Please check the task ID and ensure it exists"),
            Self::Conflict { .. } => Some("Reload the task to see its current status"),
            Self::RateLimit { .. } => Some("Please wait before requesting more coaching advice"),
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::Advisor { .. } => Some("Please check your advisor provider configuration"),
            Self::Database { .. } => Some("Please check your task store connection settings"),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StudivonError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = StudivonError::validation("actualMinutes must be positive");
        assert_eq!(err.code(), ErrorCode::ValInvalidInput);
        assert!(err.to_string().contains("actualMinutes"));
    }

    #[test]
    fn test_not_found_error() {
        let err = StudivonError::not_found("abc");
        assert_eq!(err.code(), ErrorCode::TaskNotFound);
        assert!(err.suggestion().is_some());
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_invalid_date_has_suggestion() {
        let err = StudivonError::invalid_date("next tuesday");
        assert_eq!(err.code(), ErrorCode::ValInvalidDate);
        assert!(err.suggestion().unwrap().contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_only_rate_limit_is_transient() {
        assert!(StudivonError::rate_limit("429").is_transient());
        assert!(!StudivonError::advisor("boom").is_transient());
        assert!(!StudivonError::database("down").is_transient());
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::TaskNotFound.as_str(), "TASK_001");
        assert_eq!(ErrorCode::TaskAlreadyCompleted.as_str(), "TASK_002");
        assert_eq!(ErrorCode::RateLimitExceeded.as_str(), "RATE_001");
    }
}
