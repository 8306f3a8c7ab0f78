//! PageSpace Core Business Logic Layer
//!
//! This crate provides the page model, the persistence contract, and the
//! page-tree engine behind the PageSpace document workspace sidebar.
//!
//! # Architecture
//!
//! - **Flat rows**: Pages are stored with a `parent_id` pointer and a
//!   fractional `position`; the tree is derived, never stored
//! - **Optimistic moves**: Drops apply locally first and write in the background
//! - **Sequenced writes**: Every move carries a sequence number so stale
//!   acknowledgements and out-of-order writes are discarded
//!
//! # Modules
//!
//! - [`models`] - Data structures (Page, NewPage, PageUpdate, DocumentContent)
//! - [`db`] - Persistence contract and in-memory store
//! - [`tree`] - Forest building, drop zones and placement
//! - [`services`] - Tree engine, tabs and the workspace facade
//! - [`config`] - Workspace tunables

pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod tree;

// Re-export commonly used types
pub use config::WorkspaceConfig;
pub use models::*;
pub use services::*;
pub use tree::*;
