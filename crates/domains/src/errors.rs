//! # AppError
//!
//! Centralized error handling for Inkwell.
//! Every operation either returns its record/collection or one of these.

use thiserror::Error;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Referenced record absent (e.g., user, post, comment, tag)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// Malformed input, length violations, forbidden words
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Missing or unknown bearer token, bad credentials
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but lacks ownership or the admin role
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Duplicate email/slug/tag name, duplicate like/bookmark/follow, self-follow
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (document unreadable, disk full, ...)
    #[error("internal service error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound(entity, id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    /// Short machine-readable classification used in API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(..) => "not_found",
            Self::ValidationError(_) => "validation_error",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::Internal(_) => "internal",
        }
    }
}

/// A specialized Result type for Inkwell logic.
pub type Result<T> = std::result::Result<T, AppError>;
