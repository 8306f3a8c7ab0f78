//! Persistence Layer
//!
//! This module holds the contract PageSpace expects from its persistence
//! service and an in-memory implementation of it:
//!
//! - `PageStore` - async row CRUD over the `pages` collection
//! - `InMemoryPageStore` - reference store with event emission and fault injection
//! - `FractionalOrderCalculator` - sibling position arithmetic
//!
//! # Architecture
//!
//! The hosted backend only offers row CRUD scoped by user. It never sees a
//! tree: hierarchy lives in `parent_id` and sibling order in `position`, and
//! the tree engine derives everything else.

mod error;
pub mod events;
pub mod fractional_ordering;
mod memory_store;
mod page_store;

pub use error::StoreError;
pub use events::DomainEvent;
pub use fractional_ordering::{FractionalOrderCalculator, REBALANCE_GAP_THRESHOLD};
pub use memory_store::InMemoryPageStore;
pub use page_store::PageStore;
