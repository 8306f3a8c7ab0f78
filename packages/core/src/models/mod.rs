//! Data Models
//!
//! This module contains the core data structures used throughout PageSpace:
//!
//! - `Page` - A page row as stored by the persistence service
//! - `NewPage` / `PageUpdate` - Insert and sparse update payloads
//! - `DocumentContent` - Opaque editor document
//!
//! The page tree itself is never stored; it is derived from the flat rows by
//! [`crate::tree::build_forest`].

mod document;
mod page;

pub use document::DocumentContent;
pub use page::{DeleteResult, NewPage, Page, PageUpdate, ValidationError, DEFAULT_TITLE};
