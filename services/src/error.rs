use chrono::{NaiveDate, NaiveTime};
use sea_orm::DbErr;
use std::fmt::Display;
use thiserror::Error;
use util::validation::format_validation_errors;
use validator::ValidationErrors;

/// Everything a lifecycle operation can fail with.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("{0}")]
    Validation(String),

    #[error("Cannot move from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Someone else just filled the last spot")]
    CapacityExceeded,

    #[error("Already checked in to this session")]
    AlreadyCheckedIn,

    #[error("An active enrollment for this activity already exists")]
    AlreadyEnrolled,

    #[error("A session already exists on {date} at {start_time}")]
    SessionConflict { date: NaiveDate, start_time: NaiveTime },

    #[error("QR code has expired; ask for a fresh one")]
    ExpiredCode,

    #[error("QR code does not match this session")]
    CodeMismatch,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse grouping used by callers to decide how to present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    StateConflict,
    Capacity,
    QrCode,
    NotFound,
    Forbidden,
    Internal,
}

impl ServiceError {
    pub fn transition(from: impl Display, to: impl Display) -> Self {
        ServiceError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ServiceError::Forbidden(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidRange(_) | ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::InvalidStateTransition { .. }
            | ServiceError::AlreadyCheckedIn
            | ServiceError::AlreadyEnrolled
            | ServiceError::SessionConflict { .. } => ErrorKind::StateConflict,
            ServiceError::CapacityExceeded => ErrorKind::Capacity,
            ServiceError::ExpiredCode | ServiceError::CodeMismatch => ErrorKind::QrCode,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Forbidden(_) => ErrorKind::Forbidden,
            ServiceError::Database(_) => ErrorKind::Internal,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(format_validation_errors(&errors))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
