//! Forest construction from flat page rows
//!
//! The tree is a derived view. It is rebuilt from the flat list whenever the
//! list changes instead of being kept as a mutable object that could drift
//! from the rows it came from.

use crate::models::Page;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A page with its children attached, sorted by position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageTreeNode {
    pub page: Page,
    pub children: Vec<PageTreeNode>,
}

impl PageTreeNode {
    /// Number of pages in this subtree, this one included
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(PageTreeNode::count).sum::<usize>()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Depth-first search for `id` in this subtree
    pub fn find(&self, id: &str) -> Option<&PageTreeNode> {
        if self.page.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Children grouped by parent id
///
/// Each group keeps input order and is then stably sorted by position, so
/// equal positions keep the order the rows were given in. Pages whose parent
/// is not in the list are grouped under the root.
pub struct ChildIndex<'a> {
    groups: HashMap<Option<&'a str>, Vec<&'a Page>>,
}

impl<'a> ChildIndex<'a> {
    pub fn new(pages: &'a [Page]) -> Self {
        let known: HashSet<&str> = pages.iter().map(|page| page.id.as_str()).collect();

        let mut groups: HashMap<Option<&'a str>, Vec<&'a Page>> = HashMap::new();
        for page in pages {
            let parent = page
                .parent_id
                .as_deref()
                .filter(|parent_id| known.contains(parent_id));
            groups.entry(parent).or_default().push(page);
        }

        for group in groups.values_mut() {
            group.sort_by(|a, b| a.position.total_cmp(&b.position));
        }

        Self { groups }
    }

    /// Sorted children of `parent`, `None` for the roots
    pub fn children_of(&self, parent: Option<&'a str>) -> &[&'a Page] {
        self.groups.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Build the page forest from flat rows.
///
/// Pure and deterministic: equal input yields an equal forest. Runs in
/// O(n log n) thanks to the child index.
///
/// Every input page appears exactly once. Pages with a dangling `parent_id`
/// become roots. Pages caught in a parent cycle (corrupt input) are attached
/// after the regular roots, starting from the first such page in input order.
pub fn build_forest(pages: &[Page]) -> Vec<PageTreeNode> {
    let index = ChildIndex::new(pages);
    let mut visited: HashSet<&str> = HashSet::with_capacity(pages.len());

    let mut forest: Vec<PageTreeNode> = index
        .children_of(None)
        .iter()
        .copied()
        .map(|page| attach(page, &index, &mut visited))
        .collect();

    if visited.len() < pages.len() {
        for page in pages {
            if !visited.contains(page.id.as_str()) {
                tracing::warn!(
                    "Page '{}' is part of a parent cycle; showing it at the root",
                    page.id
                );
                forest.push(attach(page, &index, &mut visited));
            }
        }
    }

    forest
}

fn attach<'a>(
    page: &'a Page,
    index: &ChildIndex<'a>,
    visited: &mut HashSet<&'a str>,
) -> PageTreeNode {
    visited.insert(page.id.as_str());

    let mut children = Vec::new();
    for &child in index.children_of(Some(page.id.as_str())) {
        // Never descend into a page already placed; only corrupt input hits this
        if !visited.contains(child.id.as_str()) {
            children.push(attach(child, index, visited));
        }
    }

    PageTreeNode {
        page: page.clone(),
        children,
    }
}

/// One rendered sidebar row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisibleRow {
    pub id: String,
    pub title: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Rows the sidebar shows: roots, plus the children of every expanded page
pub fn flatten_visible(forest: &[PageTreeNode], expanded: &HashSet<String>) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    push_rows(forest, expanded, 0, &mut rows);
    rows
}

fn push_rows(
    nodes: &[PageTreeNode],
    expanded: &HashSet<String>,
    depth: usize,
    rows: &mut Vec<VisibleRow>,
) {
    for node in nodes {
        let is_expanded = expanded.contains(&node.page.id);
        rows.push(VisibleRow {
            id: node.page.id.clone(),
            title: node.page.display_title().to_string(),
            depth,
            has_children: node.has_children(),
            expanded: is_expanded,
        });
        if is_expanded {
            push_rows(&node.children, expanded, depth + 1, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewPage;

    fn page(id: &str, parent: Option<&str>, position: f64) -> Page {
        let mut page = Page::from_new(NewPage::new("user-1", parent.map(String::from), position));
        page.id = id.to_string();
        page.title = id.to_uppercase();
        page
    }

    fn ids(nodes: &[PageTreeNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.page.id.as_str()).collect()
    }

    #[test]
    fn test_children_sorted_by_position() {
        let pages = vec![
            page("c", Some("root"), 2.0),
            page("root", None, 0.0),
            page("a", Some("root"), 0.5),
            page("b", Some("root"), 1.0),
        ];

        let forest = build_forest(&pages);

        assert_eq!(ids(&forest), vec!["root"]);
        assert_eq!(ids(&forest[0].children), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_equal_positions_keep_input_order() {
        let pages = vec![page("x", None, 1.0), page("y", None, 1.0), page("w", None, 0.0)];
        assert_eq!(ids(&build_forest(&pages)), vec!["w", "x", "y"]);
    }

    #[test]
    fn test_dangling_parent_is_promoted_to_root() {
        let pages = vec![page("a", None, 0.0), page("orphan", Some("gone"), 5.0)];
        let forest = build_forest(&pages);
        assert_eq!(ids(&forest), vec!["a", "orphan"]);
    }

    #[test]
    fn test_cycle_members_still_appear_once() {
        let pages = vec![
            page("root", None, 0.0),
            page("p", Some("q"), 0.0),
            page("q", Some("p"), 0.0),
        ];

        let forest = build_forest(&pages);
        let total: usize = forest.iter().map(PageTreeNode::count).sum();

        assert_eq!(total, 3);
        assert_eq!(ids(&forest), vec!["root", "p"]);
        assert_eq!(ids(&forest[1].children), vec!["q"]);
    }

    #[test]
    fn test_find_descends() {
        let pages = vec![
            page("a", None, 0.0),
            page("b", Some("a"), 0.0),
            page("c", Some("b"), 0.0),
        ];
        let forest = build_forest(&pages);
        assert_eq!(forest[0].find("c").map(|n| n.page.title.as_str()), Some("C"));
        assert!(forest[0].find("zzz").is_none());
    }

    #[test]
    fn test_flatten_visible_respects_expansion() {
        let pages = vec![
            page("a", None, 0.0),
            page("b", Some("a"), 0.0),
            page("c", Some("b"), 0.0),
            page("d", None, 1.0),
        ];
        let forest = build_forest(&pages);

        let collapsed = flatten_visible(&forest, &HashSet::new());
        assert_eq!(
            collapsed.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["a", "d"]
        );
        assert!(collapsed[0].has_children);

        let expanded: HashSet<String> = ["a".to_string()].into_iter().collect();
        let rows = flatten_visible(&forest, &expanded);
        assert_eq!(
            rows.iter().map(|r| (r.id.as_str(), r.depth)).collect::<Vec<_>>(),
            vec![("a", 0), ("b", 1), ("d", 0)]
        );
    }
}
