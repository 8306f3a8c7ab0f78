//! Service Layer Error Types
//!
//! Errors returned by [`super::PageTreeEngine`] operations that talk to the
//! store. The workspace facade logs and swallows them; nothing past it sees
//! an error.

use crate::db::StoreError;
use crate::models::ValidationError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageServiceError {
    /// Page not in the local list
    #[error("Page not found: {id}")]
    PageNotFound { id: String },

    /// Parent for a new page is not in the local list
    #[error("Invalid parent page: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Store call failed
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Payload rejected locally
    #[error("Page validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl PageServiceError {
    pub fn page_not_found(id: impl Into<String>) -> Self {
        Self::PageNotFound { id: id.into() }
    }

    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }
}
