//! Error types for the mediation core
//!
//! Each error type has a corresponding error code for programmatic handling.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schemas::{CaseStatus, IntakeStep};

/// Result type alias for mediation operations
pub type Result<T> = std::result::Result<T, MediateError>;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. "parties[1].contact")
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn step_label(step: &Option<IntakeStep>) -> String {
    match step {
        Some(step) => format!(" in step {}", step),
        None => String::new(),
    }
}

/// Main error type for all mediation operations
#[derive(Debug, Error)]
pub enum MediateError {
    /// Payload failed validation; the caller can correct the input
    #[error("Validation failed{}: {}", step_label(.step), join_fields(.errors))]
    Validation {
        step: Option<IntakeStep>,
        errors: Vec<FieldError>,
    },

    /// Session, case, panelist or assignment does not exist
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The Party A session already has a Party B (session or submission)
    #[error("Session {0} already has a second party")]
    AlreadyJoined(String),

    /// The panelist already submitted a resolution for the case
    #[error("Panelist {panelist_id} already submitted a resolution for case {case_id}")]
    AlreadySubmitted {
        case_id: String,
        panelist_id: String,
    },

    /// Finalize attempted before every intake step was completed
    #[error("Intake is incomplete: step {missing_step} has not been submitted")]
    IncompleteSubmission { missing_step: IntakeStep },

    /// Illegal case status change
    #[error("Cannot transition case from {from} to {to}: {reason}")]
    InvalidTransition {
        from: CaseStatus,
        to: CaseStatus,
        reason: String,
    },

    /// Panelist is at their maximum case load
    #[error("Panelist {panelist_id} is at capacity ({load}/{max} active cases)")]
    CapacityExceeded {
        panelist_id: String,
        load: usize,
        max: usize,
    },

    /// Session was finalized and is read-only
    #[error("Session {0} is archived")]
    SessionArchived(String),

    /// Case is closed; only notes may be added
    #[error("Case {0} is closed")]
    CaseClosed(String),

    /// Caller is not allowed to perform the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// No .mediate directory could be located
    #[error("Store not found: {0}")]
    StoreNotFound(String),

    /// Invalid JSON format
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error with context
    #[error("{context}: {message}")]
    Wrapped { context: String, message: String },
}

impl MediateError {
    /// Get the error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            MediateError::Validation { .. } => "VALIDATION_ERROR",
            MediateError::NotFound { .. } => "NOT_FOUND",
            MediateError::AlreadyJoined(_) => "ALREADY_JOINED",
            MediateError::AlreadySubmitted { .. } => "ALREADY_SUBMITTED",
            MediateError::IncompleteSubmission { .. } => "INCOMPLETE_SUBMISSION",
            MediateError::InvalidTransition { .. } => "INVALID_TRANSITION",
            MediateError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            MediateError::SessionArchived(_) => "SESSION_ARCHIVED",
            MediateError::CaseClosed(_) => "CASE_CLOSED",
            MediateError::Forbidden(_) => "FORBIDDEN",
            MediateError::StoreNotFound(_) => "STORE_NOT_FOUND",
            MediateError::InvalidJson(_) => "INVALID_JSON",
            MediateError::ConfigError(_) => "CONFIG_ERROR",
            MediateError::Io(_) => "IO_ERROR",
            MediateError::Wrapped { .. } => "WRAPPED_ERROR",
        }
    }

    /// Shorthand for a `NotFound` error
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        MediateError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for a single-field validation error
    pub fn invalid_field(
        step: Option<IntakeStep>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        MediateError::Validation {
            step,
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// Wrap an error with additional context
    pub fn wrap<E: std::fmt::Display>(error: E, context: impl Into<String>) -> Self {
        MediateError::Wrapped {
            context: context.into(),
            message: error.to_string(),
        }
    }
}

/// Convert an error to an appropriate exit code
pub fn to_exit_code(error: &MediateError) -> i32 {
    match error {
        MediateError::Validation { .. } => 2,
        MediateError::Forbidden(_) => 3,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(MediateError::not_found("case", "c-1").code(), "NOT_FOUND");
        assert_eq!(MediateError::AlreadyJoined("s-1".into()).code(), "ALREADY_JOINED");
        assert_eq!(
            MediateError::AlreadySubmitted {
                case_id: "c".into(),
                panelist_id: "p".into()
            }
            .code(),
            "ALREADY_SUBMITTED"
        );
        assert_eq!(
            MediateError::IncompleteSubmission {
                missing_step: IntakeStep::Background
            }
            .code(),
            "INCOMPLETE_SUBMISSION"
        );
        assert_eq!(
            MediateError::CapacityExceeded {
                panelist_id: "p".into(),
                load: 3,
                max: 3
            }
            .code(),
            "CAPACITY_EXCEEDED"
        );
        assert_eq!(MediateError::CaseClosed("c".into()).code(), "CASE_CLOSED");
        assert_eq!(MediateError::SessionArchived("s".into()).code(), "SESSION_ARCHIVED");
        assert_eq!(MediateError::Forbidden("x".into()).code(), "FORBIDDEN");
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let err = MediateError::Validation {
            step: Some(IntakeStep::Background),
            errors: vec![
                FieldError::new("timeline", "is required"),
                FieldError::new("key_issues", "must contain at least one issue"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("step background"));
        assert!(msg.contains("timeline: is required"));
        assert!(msg.contains("key_issues"));
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = MediateError::InvalidTransition {
            from: CaseStatus::Closed,
            to: CaseStatus::Open,
            reason: "case is closed".into(),
        };
        assert_eq!(err.code(), "INVALID_TRANSITION");
        assert!(err.to_string().contains("from closed to open"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(to_exit_code(&MediateError::invalid_field(None, "notes", "too short")), 2);
        assert_eq!(to_exit_code(&MediateError::Forbidden("admin only".into())), 3);
        assert_eq!(to_exit_code(&MediateError::CaseClosed("c".into())), 1);
    }

    #[test]
    fn test_wrap_error() {
        let wrapped = MediateError::wrap("inner error", "outer context");
        assert_eq!(wrapped.code(), "WRAPPED_ERROR");
        assert!(wrapped.to_string().contains("outer context"));
        assert!(wrapped.to_string().contains("inner error"));
    }
}
