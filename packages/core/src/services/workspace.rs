//! Workspace facade
//!
//! Ties the page tree engine to the open tabs and the current route for one
//! signed-in user. This is the component boundary: failures are logged here
//! and reported as `None`/`false`, never as errors.

use super::page_tree::PageTreeEngine;
use super::tabs::{Route, TabSet};
use crate::config::WorkspaceConfig;
use crate::db::PageStore;
use crate::models::{DocumentContent, Page};
use std::sync::Arc;
use uuid::Uuid;

pub struct Workspace {
    user_id: String,
    engine: PageTreeEngine,
    tabs: TabSet,
    route: Route,
}

impl Workspace {
    pub fn new(store: Arc<dyn PageStore>, config: WorkspaceConfig, user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            engine: PageTreeEngine::new(store, config),
            tabs: TabSet::new(),
            route: Route::Home,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn engine(&self) -> &PageTreeEngine {
        &self.engine
    }

    /// Drag-and-drop and expansion go straight to the engine
    pub fn engine_mut(&mut self) -> &mut PageTreeEngine {
        &mut self.engine
    }

    pub fn tabs(&self) -> &TabSet {
        &self.tabs
    }

    /// Close a tab; the route follows whichever tab becomes active
    pub fn close_tab(&mut self, id: &str) -> bool {
        let closed = self.tabs.remove(id);
        self.follow_active_tab();
        closed
    }

    /// Switch to an open tab
    pub fn select_tab(&mut self, id: &str) -> bool {
        if !self.tabs.set_active(id) {
            return false;
        }
        self.follow_active_tab();
        true
    }

    pub fn reorder_tabs(&mut self, from: usize, to: usize) -> bool {
        self.tabs.reorder(from, to)
    }

    /// Point the route at the active tab, or home when none is active.
    ///
    /// A route already showing the active tab is kept, so its editing flag
    /// survives.
    fn follow_active_tab(&mut self) {
        let Some(active) = self.tabs.active_id() else {
            self.route = Route::Home;
            return;
        };
        if self.route.target_id() == Some(active) {
            return;
        }

        self.route = if self.is_draft_id(active) {
            Route::Draft {
                id: active.to_string(),
            }
        } else {
            Route::Page {
                id: active.to_string(),
                editing: false,
            }
        };
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Fetch the user's pages. Returns `false` if the fetch failed and the
    /// previous list is still shown.
    pub async fn load(&mut self) -> bool {
        // The engine logs the failure
        self.engine.refresh(&self.user_id).await.is_ok()
    }

    /// Show a page, opening (or re-activating) its tab
    pub fn open_page(&mut self, id: &str, editing: bool) -> bool {
        let Some(page) = self.engine.page(id) else {
            tracing::warn!("Cannot open unknown page '{}'", id);
            return false;
        };
        let title = page.display_title().to_string();

        self.tabs.add(id, title);
        self.route = Route::Page {
            id: id.to_string(),
            editing,
        };
        true
    }

    /// Create an untitled page under `parent_id` and open it for editing
    pub async fn create_page(&mut self, parent_id: Option<&str>) -> Option<Page> {
        match self.engine.create_page(&self.user_id, parent_id).await {
            Ok(page) => {
                self.open_page(&page.id, true);
                Some(page)
            }
            Err(e) => {
                tracing::error!("Error creating page: {}", e);
                None
            }
        }
    }

    pub async fn rename_page(&mut self, id: &str, title: &str) -> bool {
        match self.engine.rename_page(id, title).await {
            Ok(page) => {
                self.tabs.rename(id, page.display_title());
                true
            }
            Err(e) => {
                tracing::error!("Error renaming page '{}': {}", id, e);
                false
            }
        }
    }

    /// Save title and document of an existing page
    pub async fn save_page(&mut self, id: &str, title: &str, content: DocumentContent) -> bool {
        match self.engine.save_content(id, title, content).await {
            Ok(page) => {
                self.tabs.rename(id, page.display_title());
                true
            }
            Err(e) => {
                tracing::error!("Error saving page '{}': {}", id, e);
                false
            }
        }
    }

    /// Delete a page and its subtree after `confirm` approves.
    ///
    /// Tabs of removed pages close and the route follows the tab left active.
    pub async fn delete_page<F>(&mut self, id: &str, confirm: F) -> bool
    where
        F: FnOnce(&Page) -> bool,
    {
        let removed = match self.engine.delete_page(id, confirm).await {
            Ok(Some(removed)) => removed,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!("Error deleting page '{}': {}", id, e);
                return false;
            }
        };

        for removed_id in &removed {
            self.tabs.remove(removed_id);
        }
        self.follow_active_tab();
        true
    }

    /// Open a blank draft tab; nothing is stored until [`save_draft`](Self::save_draft)
    pub fn open_draft(&mut self) -> String {
        let draft_id = format!("{}{}", self.engine.config().draft_id_prefix, Uuid::new_v4());
        self.tabs.add(draft_id.clone(), crate::models::DEFAULT_TITLE);
        self.route = Route::Draft {
            id: draft_id.clone(),
        };
        draft_id
    }

    pub fn is_draft_id(&self, id: &str) -> bool {
        id.starts_with(&self.engine.config().draft_id_prefix)
    }

    /// Persist a draft as a new root page, swap its tab to the stored id and
    /// navigate there.
    pub async fn save_draft(
        &mut self,
        draft_id: &str,
        title: &str,
        content: DocumentContent,
    ) -> Option<Page> {
        if !self.is_draft_id(draft_id) {
            tracing::warn!("'{}' is not a draft id", draft_id);
            return None;
        }

        let page = match self
            .engine
            .create_root_page_with(&self.user_id, title, content)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::error!("Error saving draft '{}': {}", draft_id, e);
                return None;
            }
        };

        if self.tabs.replace_id(draft_id, page.id.clone()) {
            self.tabs.rename(&page.id, page.display_title());
        } else {
            self.tabs.add(page.id.clone(), page.display_title());
        }
        self.tabs.set_active(&page.id);
        self.route = Route::Page {
            id: page.id.clone(),
            editing: false,
        };

        self.load().await;
        Some(page)
    }

    /// Discard an unsaved draft
    pub fn close_draft(&mut self, draft_id: &str) {
        self.close_tab(draft_id);
    }

    /// Title/content search; short queries return nothing
    pub async fn search(&self, query: &str) -> Vec<Page> {
        let config = self.engine.config();
        let query = query.trim();
        if query.chars().count() < config.search_min_query_len {
            return Vec::new();
        }

        match self
            .engine
            .store()
            .search_pages(&self.user_id, query, config.search_result_limit)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Error searching pages: {}", e);
                Vec::new()
            }
        }
    }
}
