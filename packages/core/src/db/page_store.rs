//! PageStore Trait - Persistence Abstraction Layer
//!
//! This module defines the `PageStore` trait that abstracts the remote
//! persistence service holding the `pages` collection. Business logic in
//! [`crate::services::PageTreeEngine`] talks only to this trait, so a hosted
//! backend and the in-memory store are interchangeable.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: Every method is async; the real backend is remote
//! 2. **Ownership Semantics**: Payloads are taken by value to avoid cloning
//! 3. **Typed Errors**: `StoreError` lets callers tell a stale write apart
//!    from an outage
//! 4. **No Transactions**: The backend offers row CRUD only
//!
//! # Examples
//!
//! ```rust
//! use pagespace_core::db::{InMemoryPageStore, PageStore};
//! use pagespace_core::models::NewPage;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let store: Arc<dyn PageStore> = Arc::new(InMemoryPageStore::new());
//! let created = store.create_page(NewPage::new("user-1", None, 0.0)).await?;
//! let listed = store.list_pages("user-1").await?;
//! assert_eq!(listed[0].id, created.id);
//! # Ok::<(), pagespace_core::db::StoreError>(())
//! # }).unwrap();
//! ```

use super::StoreError;
use crate::models::{DeleteResult, NewPage, Page, PageUpdate};
use async_trait::async_trait;

/// Abstraction over the `pages` collection
///
/// Columns: `id, user_id, title, parent_id, position, content, created_at,
/// updated_at`. The tree engine depends only on `parent_id` and `position`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: move writes run on spawned tokio
/// tasks that hold an `Arc<dyn PageStore>`.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// List every page owned by `user_id`
    ///
    /// Ordered ascending by `position`; ties keep creation order.
    async fn list_pages(&self, user_id: &str) -> Result<Vec<Page>, StoreError>;

    /// Get a page by id
    ///
    /// # Returns
    ///
    /// - `Ok(Some(page))` if the page exists
    /// - `Ok(None)` if it doesn't (not an error)
    async fn get_page(&self, id: &str) -> Result<Option<Page>, StoreError>;

    /// Insert a page and return the created row
    async fn create_page(&self, page: NewPage) -> Result<Page, StoreError>;

    /// Apply a sparse update by id and return the full updated row
    ///
    /// # Errors
    ///
    /// - `NotFound` if the page doesn't exist
    /// - `StaleWrite` if `update.sequence` is not newer than the last sequenced
    ///   write applied to this page
    /// - `Validation` for non-finite positions or self-parenting
    async fn update_page(&self, id: &str, update: PageUpdate) -> Result<Page, StoreError>;

    /// Delete a page and every descendant
    ///
    /// Deleting a missing id is not an error; it returns
    /// [`DeleteResult::not_found`].
    async fn delete_page(&self, id: &str) -> Result<DeleteResult, StoreError>;

    /// Case-insensitive substring search over title and document text
    ///
    /// Scoped to `user_id`, at most `limit` rows, no ranking.
    async fn search_pages(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Page>, StoreError>;
}
