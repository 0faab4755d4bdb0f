//! Error types for the Settlement Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that abort an engine call. Per-employee data gaps
//! inside a batch are not errors; they are reported as
//! [`SkippedEmployee`](crate::models::SkippedEmployee) entries instead.

use thiserror::Error;

/// The main error type for the Settlement Engine.
///
/// # Example
///
/// ```
/// use settlement_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/tax.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/tax.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or violates a config invariant.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Malformed input or a cross-entity mismatch. Raised before any state change.
    #[error("Validation error: {message}")]
    Validation {
        /// Summary of what was rejected.
        message: String,
        /// One entry per offending input item, if the input was a batch.
        details: Vec<String>,
    },

    /// An illegal state transition was requested.
    #[error("Invalid state: {message}")]
    InvalidState {
        /// A description of the rejected transition.
        message: String,
    },

    /// Configuration required for one employee is absent.
    #[error("Missing configuration for employee '{employee_id}': {missing}")]
    MissingConfiguration {
        /// The employee whose configuration is incomplete.
        employee_id: String,
        /// What is missing (e.g. "salary structure").
        missing: String,
    },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "Employee").
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A month string was not in `YYYY-MM` form.
    #[error("Invalid month '{value}': expected YYYY-MM")]
    InvalidMonth {
        /// The rejected input.
        value: String,
    },

    /// An operation failed to run to completion (e.g. its worker panicked).
    #[error("Internal error: {message}")]
    Internal {
        /// What failed.
        message: String,
    },
}

impl EngineError {
    /// Shorthand for a validation error without per-item details.
    pub fn validation(message: impl Into<String>) -> Self {
        EngineError::Validation {
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Shorthand for an invalid state transition.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        EngineError::InvalidState {
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
