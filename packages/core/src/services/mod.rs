//! Business Services
//!
//! Stateful services built on the pure tree logic in [`crate::tree`]:
//!
//! - `PageTreeEngine` - page list, expansion, drag-and-drop and the write ledger
//! - `TabSet` / `Route` - open tabs and what the main pane shows
//! - `Workspace` - per-user facade that logs and swallows service errors
//!
//! Services coordinate between the persistence layer and the UI, implementing
//! the ordering rules and orchestrating optimistic writes.

pub mod error;
pub mod page_tree;
pub mod tabs;
pub mod workspace;

pub use error::PageServiceError;
pub use page_tree::{DropOutcome, MoveCommand, PageTreeEngine, ReconcileReport};
pub use tabs::{Route, Tab, TabSet};
pub use workspace::Workspace;
