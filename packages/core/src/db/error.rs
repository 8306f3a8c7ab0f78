//! Store Error Types
//!
//! This module defines error types for persistence operations, covering
//! missing rows, rejected out-of-order writes and an unreachable backend.

use crate::models::ValidationError;
use thiserror::Error;

/// Persistence operation errors
///
/// Returned by every [`super::PageStore`] method. Service-layer code decides
/// whether an error is terminal, logged, or retried (nothing is retried today).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No row with this id
    #[error("Page not found: {id}")]
    NotFound { id: String },

    /// A write stamped with an older sequence arrived after a newer one
    #[error("Stale write for page '{id}': sequence {incoming} is not newer than applied sequence {applied}")]
    StaleWrite {
        id: String,
        incoming: u64,
        applied: u64,
    },

    /// The backend could not be reached or refused the request
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Payload rejected before it reached storage
    #[error("Invalid payload: {0}")]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Whether the write was refused only because a newer one already landed
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleWrite { .. })
    }
}
