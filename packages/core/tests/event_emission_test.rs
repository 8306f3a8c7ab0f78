//! Event Emission Tests
//!
//! The in-memory store emits exactly one event per affected page, after the
//! write has been applied.

#[cfg(test)]
mod event_emission_tests {
    use anyhow::Result;
    use pagespace_core::db::{DomainEvent, InMemoryPageStore, PageStore};
    use pagespace_core::{NewPage, PageUpdate};
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_create_emits_page_created() -> Result<()> {
        let store = InMemoryPageStore::new();
        let mut rx = store.subscribe_to_events();

        let created = store
            .create_page(NewPage::new("user-1", None, 0.0).with_title("Inbox"))
            .await?;

        let event = timeout(Duration::from_secs(1), rx.recv()).await??;
        match event {
            DomainEvent::PageCreated(page) => assert_eq!(page.id, created.id),
            other => panic!("expected PageCreated, got {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_update_emits_page_updated() -> Result<()> {
        let store = InMemoryPageStore::new();
        let created = store.create_page(NewPage::new("user-1", None, 0.0)).await?;
        let mut rx = store.subscribe_to_events();

        store
            .update_page(&created.id, PageUpdate::new().with_title("Renamed"))
            .await?;

        let event = timeout(Duration::from_secs(1), rx.recv()).await??;
        assert_eq!(event.event_type(), "page:updated");
        assert_eq!(event.page_id(), created.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_subtree_delete_emits_one_event_per_page() -> Result<()> {
        let store = InMemoryPageStore::new();
        let root = store.create_page(NewPage::new("user-1", None, 0.0)).await?;
        let child = store
            .create_page(NewPage::new("user-1", Some(root.id.clone()), 0.0))
            .await?;
        let mut rx = store.subscribe_to_events();

        store.delete_page(&root.id).await?;

        let mut deleted = Vec::new();
        for _ in 0..2 {
            let event = timeout(Duration::from_secs(1), rx.recv()).await??;
            assert_eq!(event.event_type(), "page:deleted");
            deleted.push(event.page_id().to_string());
        }
        assert_eq!(deleted, vec![root.id, child.id]);
        assert!(rx.try_recv().is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_write_emits_nothing() -> Result<()> {
        let store = InMemoryPageStore::new();
        let mut rx = store.subscribe_to_events();
        store.fail_next_writes(1);

        assert!(store.create_page(NewPage::new("user-1", None, 0.0)).await.is_err());
        assert!(rx.try_recv().is_err());
        Ok(())
    }
}
