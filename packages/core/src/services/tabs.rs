//! Open tabs and the current route
//!
//! Tabs are an ordered list of open pages (and unsaved drafts) with at most
//! one active. The route says what the main pane shows.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub title: String,
}

/// What the main pane shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum Route {
    #[default]
    Home,
    Page { id: String, editing: bool },
    Draft { id: String },
}

impl Route {
    /// Page or draft id shown by this route
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Route::Home => None,
            Route::Page { id, .. } | Route::Draft { id } => Some(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabSet {
    tabs: Vec<Tab>,
    active_id: Option<String>,
}

impl TabSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tabs.iter().any(|tab| tab.id == id)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Open a tab and make it active; an already open tab is only re-activated
    pub fn add(&mut self, id: impl Into<String>, title: impl Into<String>) {
        let id = id.into();
        if !self.contains(&id) {
            self.tabs.push(Tab {
                id: id.clone(),
                title: title.into(),
            });
        }
        self.active_id = Some(id);
    }

    /// Close a tab. Returns whether it was open.
    ///
    /// Closing the active tab activates the last remaining tab, or none.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tabs.len();
        self.tabs.retain(|tab| tab.id != id);
        let removed = self.tabs.len() != before;

        if self.active_id.as_deref() == Some(id) {
            self.active_id = self.tabs.last().map(|tab| tab.id.clone());
        }
        removed
    }

    pub fn rename(&mut self, id: &str, title: impl Into<String>) -> bool {
        match self.tabs.iter_mut().find(|tab| tab.id == id) {
            Some(tab) => {
                tab.title = title.into();
                true
            }
            None => false,
        }
    }

    /// Replace a tab's id in place, keeping its slot (draft saved as a page)
    pub fn replace_id(&mut self, old_id: &str, new_id: impl Into<String>) -> bool {
        let new_id = new_id.into();
        let Some(tab) = self.tabs.iter_mut().find(|tab| tab.id == old_id) else {
            return false;
        };
        tab.id = new_id.clone();
        if self.active_id.as_deref() == Some(old_id) {
            self.active_id = Some(new_id);
        }
        true
    }

    pub fn set_active(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.active_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_active(&mut self) {
        self.active_id = None;
    }

    /// Move the tab at `from` to index `to`
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tabs.len() || to >= self.tabs.len() {
            return false;
        }
        let tab = self.tabs.remove(from);
        self.tabs.insert(to, tab);
        true
    }
}
