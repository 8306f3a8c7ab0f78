//! Page Data Structures
//!
//! This module defines the `Page` row and the payloads used to create and
//! update it through the persistence service.
//!
//! # Architecture
//!
//! - **Flat rows**: Pages are stored flat with a `parent_id` pointer; the tree is derived
//! - **Fractional ordering**: Siblings are ordered by a real-valued `position`
//! - **Opaque content**: The editor document is carried as JSON; only search reads its text
//!
//! # Examples
//!
//! ```rust
//! use pagespace_core::models::{NewPage, PageUpdate};
//!
//! // Insert payload for a root page appended after the last root
//! let new_page = NewPage::new("user-1", None, 3.0);
//! assert_eq!(new_page.title, "Untitled");
//!
//! // Sparse update moving a page under another one
//! let update = PageUpdate::new()
//!     .with_parent(Some("page-42".to_string()))
//!     .with_position(0.5);
//! assert!(!update.is_empty());
//! ```

use super::document::DocumentContent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Title given to pages created without one
pub const DEFAULT_TITLE: &str = "Untitled";

/// Validation errors for Page payloads
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid position {position} for page '{id}': positions must be finite")]
    InvalidPosition { id: String, position: f64 },

    #[error("Page '{0}' cannot be its own parent")]
    SelfParent(String),
}

/// A page row as held by the persistence service.
///
/// # Fields
///
/// - `id`: Opaque unique identifier, immutable after creation
/// - `user_id`: Owner; every query is scoped by it
/// - `title`: Display string, defaults to "Untitled"
/// - `parent_id`: Parent page, `None` for forest roots
/// - `position`: Sort key among siblings sharing `parent_id`
/// - `content`: Opaque editor document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,

    pub user_id: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub position: f64,

    #[serde(default)]
    pub content: DocumentContent,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Page {
    /// Materialize an insert payload into a row with a fresh UUID and timestamps.
    ///
    /// Stores call this when they accept a `NewPage`.
    pub fn from_new(new_page: NewPage) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: new_page.user_id,
            title: normalize_title(new_page.title),
            parent_id: new_page.parent_id,
            position: new_page.position,
            content: new_page.content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this page sits at the forest root
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Title for display, falling back to the default for blank titles
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }

    /// Validate structural fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }
        if self.user_id.is_empty() {
            return Err(ValidationError::MissingField("user_id".to_string()));
        }
        if !self.position.is_finite() {
            return Err(ValidationError::InvalidPosition {
                id: self.id.clone(),
                position: self.position,
            });
        }
        if self.parent_id.as_deref() == Some(self.id.as_str()) {
            return Err(ValidationError::SelfParent(self.id.clone()));
        }
        Ok(())
    }

    /// Apply a sparse update in place, bumping `updated_at`.
    pub fn apply(&mut self, update: &PageUpdate) {
        if let Some(title) = &update.title {
            self.title = normalize_title(title.clone());
        }
        if let Some(parent_id) = &update.parent_id {
            self.parent_id = parent_id.clone();
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        self.updated_at = Utc::now();
    }
}

fn normalize_title(title: String) -> String {
    if title.trim().is_empty() {
        default_title()
    } else {
        title
    }
}

/// Insert payload; the store assigns `id` and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPage {
    pub user_id: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub position: f64,
    pub content: DocumentContent,
}

impl NewPage {
    /// Untitled page with an empty document
    pub fn new(user_id: impl Into<String>, parent_id: Option<String>, position: f64) -> Self {
        Self {
            user_id: user_id.into(),
            title: default_title(),
            parent_id,
            position,
            content: DocumentContent::empty(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: DocumentContent) -> Self {
        self.content = content;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.is_empty() {
            return Err(ValidationError::MissingField("user_id".to_string()));
        }
        if !self.position.is_finite() {
            return Err(ValidationError::InvalidPosition {
                id: "<new>".to_string(),
                position: self.position,
            });
        }
        Ok(())
    }
}

/// Maps a present JSON field onto the double-Option pattern
///
/// - Missing field → None (don't update)
/// - null → Some(None) (set to NULL)
/// - "value" → Some(Some("value"))
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    // Missing field is handled by #[serde(default)] on the struct field
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial page update for PATCH-style writes
///
/// Only `Some` fields are written. `parent_id` is doubly optional so that
/// `Some(None)` moves a page to the root while `None` leaves it untouched.
///
/// `sequence` is not a column: it stamps move writes so the store can refuse
/// a write that arrives after a newer one for the same page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_optional_field",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_id: Option<Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<DocumentContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl PageUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_position(mut self, position: f64) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_content(mut self, content: DocumentContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// True when no column would change
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.parent_id.is_none()
            && self.position.is_none()
            && self.content.is_none()
    }

    /// Reject updates the store must never accept
    pub fn validate_for(&self, id: &str) -> Result<(), ValidationError> {
        if let Some(position) = self.position {
            if !position.is_finite() {
                return Err(ValidationError::InvalidPosition {
                    id: id.to_string(),
                    position,
                });
            }
        }
        if let Some(Some(parent_id)) = &self.parent_id {
            if parent_id == id {
                return Err(ValidationError::SelfParent(id.to_string()));
            }
        }
        Ok(())
    }
}

/// Result of a delete call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Whether the page existed
    pub existed: bool,
    /// Every id removed, the page itself first, then its descendants
    pub removed_ids: Vec<String>,
}

impl DeleteResult {
    pub fn removed(removed_ids: Vec<String>) -> Self {
        Self {
            existed: !removed_ids.is_empty(),
            removed_ids,
        }
    }

    pub fn not_found() -> Self {
        Self {
            existed: false,
            removed_ids: Vec::new(),
        }
    }
}
