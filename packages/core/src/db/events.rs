//! Domain Events for page stores
//!
//! Stores emit these events after a write has been applied, following the
//! observer pattern so that other parts of the system can watch data change
//! without coupling to a store implementation.
//!
//! # Event Flow
//!
//! 1. The store applies a create, update or delete
//! 2. A domain event is sent on a tokio broadcast channel
//! 3. Every subscriber receives it asynchronously

use crate::models::Page;

/// Domain events emitted by page stores
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A new page was inserted
    PageCreated(Page),

    /// An existing page was updated (title, content, parent or position)
    PageUpdated(Page),

    /// A page was deleted; emitted once per removed id, descendants included
    PageDeleted { id: String },
}

impl DomainEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::PageCreated(_) => "page:created",
            DomainEvent::PageUpdated(_) => "page:updated",
            DomainEvent::PageDeleted { .. } => "page:deleted",
        }
    }

    /// Id of the page the event concerns
    pub fn page_id(&self) -> &str {
        match self {
            DomainEvent::PageCreated(page) | DomainEvent::PageUpdated(page) => &page.id,
            DomainEvent::PageDeleted { id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_strings() {
        let deleted = DomainEvent::PageDeleted {
            id: "page-9".to_string(),
        };
        assert_eq!(deleted.event_type(), "page:deleted");
        assert_eq!(deleted.page_id(), "page-9");
    }
}
