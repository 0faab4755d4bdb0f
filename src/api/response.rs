//! Response types for the Settlement Engine API.
//!
//! This module defines the error response structures, the mapping from
//! [`EngineError`] to HTTP status codes, and the small response bodies
//! that are not engine types themselves.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{KpiScore, Month};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Per-item details, e.g. one entry per rejected upload row.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::new("CONFIG_ERROR", message),
                }
            }
            EngineError::Validation { details, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details("VALIDATION_ERROR", message, details),
            },
            EngineError::InvalidMonth { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("INVALID_MONTH", message),
            },
            EngineError::NotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("NOT_FOUND", message),
            },
            EngineError::InvalidState { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::new("INVALID_STATE", message),
            },
            EngineError::MissingConfiguration { .. } => ApiErrorResponse {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: ApiError::new("MISSING_CONFIGURATION", message),
            },
            EngineError::Internal { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("INTERNAL_ERROR", message),
            },
        }
    }
}

/// Body of `GET /kpi/scores/:employee_id/:month`.
///
/// `score` is `null` when the employee's role has no active KPI template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    /// The employee.
    pub employee_id: String,
    /// The month.
    pub month: Month,
    /// The computed score, if the employee can be scored.
    pub score: Option<KpiScore>,
}
