//! Page Tree Property Tests
//!
//! Properties that must hold for any page list: every page appears exactly
//! once in the forest, building is deterministic, and drops never create a
//! cycle or move a page onto itself.

#[cfg(test)]
mod page_tree_properties_tests {
    use anyhow::Result;
    use pagespace_core::db::InMemoryPageStore;
    use pagespace_core::tree::{build_forest, PageTreeNode};
    use pagespace_core::{
        DropOutcome, DropRejection, NewPage, Page, PageTreeEngine, WorkspaceConfig,
    };
    use std::collections::HashMap;
    use std::sync::Arc;

    const ROW_HEIGHT: f64 = 40.0;
    const BEFORE: f64 = 2.0;
    const INNER: f64 = 20.0;
    const AFTER: f64 = 38.0;

    fn page(id: &str, parent: Option<&str>, position: f64) -> Page {
        let mut page = Page::from_new(
            NewPage::new("user-1", parent.map(String::from), position).with_title(id),
        );
        page.id = id.to_string();
        page
    }

    async fn engine_with(pages: Vec<Page>) -> Result<PageTreeEngine> {
        let store = Arc::new(InMemoryPageStore::with_pages(pages));
        let mut engine = PageTreeEngine::new(store, WorkspaceConfig::default());
        engine.refresh("user-1").await?;
        Ok(engine)
    }

    /// Count of each id across the forest
    fn occurrences(forest: &[PageTreeNode]) -> HashMap<String, usize> {
        fn walk(node: &PageTreeNode, counts: &mut HashMap<String, usize>) {
            *counts.entry(node.page.id.clone()).or_default() += 1;
            for child in &node.children {
                walk(child, counts);
            }
        }
        let mut counts = HashMap::new();
        for node in forest {
            walk(node, &mut counts);
        }
        counts
    }

    fn is_sorted(nodes: &[PageTreeNode]) -> bool {
        nodes
            .windows(2)
            .all(|pair| pair[0].page.position <= pair[1].page.position)
            && nodes.iter().all(|node| is_sorted(&node.children))
    }

    fn mixed_pages() -> Vec<Page> {
        vec![
            page("c", Some("a"), 2.0),
            page("a", None, 1.0),
            page("orphan", Some("deleted-parent"), 0.5),
            page("b", Some("a"), 1.0),
            page("d", Some("b"), 0.0),
            page("e", None, 0.0),
            page("loop-1", Some("loop-2"), 0.0),
            page("loop-2", Some("loop-1"), 0.0),
        ]
    }

    #[test]
    fn test_every_page_appears_exactly_once() {
        let pages = mixed_pages();
        let forest = build_forest(&pages);
        let counts = occurrences(&forest);

        assert_eq!(counts.len(), pages.len());
        assert!(counts.values().all(|&count| count == 1));
        assert!(is_sorted(&forest));

        // Dangling parent is shown at the root
        assert!(forest.iter().any(|node| node.page.id == "orphan"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let pages = mixed_pages();
        assert_eq!(build_forest(&pages), build_forest(&pages));
    }

    #[test]
    fn test_equal_positions_keep_input_order() {
        let pages = vec![
            page("first", None, 1.0),
            page("second", None, 1.0),
            page("third", None, 1.0),
        ];
        let ids: Vec<String> = build_forest(&pages)
            .into_iter()
            .map(|node| node.page.id)
            .collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_drop_under_descendant_is_rejected_in_every_zone() -> Result<()> {
        let mut engine = engine_with(vec![
            page("a", None, 0.0),
            page("b", Some("a"), 0.0),
            page("c", Some("b"), 0.0),
        ])
        .await?;
        let before = engine.pages().to_vec();

        for offset in [BEFORE, INNER, AFTER] {
            engine.start_drag("a");
            engine.hover_drop("c", offset, ROW_HEIGHT);
            let outcome = engine.commit_drop(Some("c"));

            assert!(matches!(
                outcome,
                DropOutcome::Rejected(DropRejection::Cycle { .. })
            ));
            assert_eq!(engine.pages(), before.as_slice());
            assert!(engine.dragging_id().is_none());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_midpoint_and_after_last_positions() -> Result<()> {
        let pages = vec![
            page("s0", None, 0.0),
            page("s1", None, 1.0),
            page("s2", None, 2.0),
            page("x", None, 10.0),
        ];

        let mut engine = engine_with(pages.clone()).await?;
        engine.start_drag("x");
        engine.hover_drop("s1", BEFORE, ROW_HEIGHT);
        engine.commit_drop(Some("s1"));
        assert_eq!(engine.page("x").map(|p| p.position), Some(0.5));
        engine.settle().await;

        let mut engine = engine_with(pages).await?;
        engine.start_drag("x");
        engine.hover_drop("s2", AFTER, ROW_HEIGHT);
        engine.commit_drop(Some("s2"));
        assert_eq!(engine.page("x").map(|p| p.position), Some(3.0));
        engine.settle().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_root_drop_positions() -> Result<()> {
        let mut engine = engine_with(vec![page("a", None, 5.0), page("x", Some("a"), 0.0)]).await?;

        // Appended after the last root
        engine.start_drag("x");
        engine.hover_root();
        let DropOutcome::Moved(command) = engine.commit_drop(None) else {
            panic!("root drop should move");
        };
        assert_eq!(command.parent_id, None);
        assert_eq!(command.position, 6.0);
        engine.settle().await;

        // The only root is the dragged page itself
        let mut engine = engine_with(vec![page("x", None, 7.0)]).await?;
        engine.start_drag("x");
        engine.hover_root();
        let DropOutcome::Moved(command) = engine.commit_drop(None) else {
            panic!("root drop should move");
        };
        assert_eq!(command.position, 0.0);
        engine.settle().await;
        Ok(())
    }

    #[tokio::test]
    async fn test_self_drop_is_noop() -> Result<()> {
        let mut engine = engine_with(vec![page("a", None, 0.0), page("b", None, 1.0)]).await?;
        let before = engine.pages().to_vec();

        engine.start_drag("a");
        // Hovering the dragged row records nothing
        assert_eq!(engine.hover_drop("a", INNER, ROW_HEIGHT), None);
        assert!(engine.drop_target().is_none());

        // Committing on it anyway changes nothing
        engine.hover_drop("b", INNER, ROW_HEIGHT);
        assert_eq!(
            engine.commit_drop(Some("a")),
            DropOutcome::Rejected(DropRejection::SelfDrop("a".to_string()))
        );
        assert_eq!(engine.pages(), before.as_slice());
        assert_eq!(engine.pending_writes(), 0);
        Ok(())
    }
}
