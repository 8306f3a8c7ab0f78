//! Drag session state and drop-zone geometry
//!
//! A row is split vertically into three zones. With the default edge
//! fraction of 0.25 the top quarter means "before", the bottom quarter
//! "after" and the middle half "inner" (become a child).

use serde::{Deserialize, Serialize};

/// Where a dragged page lands relative to the hovered row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropZone {
    Before,
    After,
    Inner,
}

impl DropZone {
    /// Zone for a pointer `offset` pixels below the top of a row `row_height` tall.
    ///
    /// Degenerate rows (zero or negative height, non-finite input) resolve to
    /// `Inner`.
    pub fn from_offset(offset: f64, row_height: f64, edge_fraction: f64) -> Self {
        if !(offset.is_finite() && row_height.is_finite() && row_height > 0.0) {
            return DropZone::Inner;
        }

        let threshold = row_height * edge_fraction;
        if offset < threshold {
            DropZone::Before
        } else if offset > row_height - threshold {
            DropZone::After
        } else {
            DropZone::Inner
        }
    }
}

/// What the pointer is over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DropTargetId {
    /// A page row
    Page(String),
    /// The empty canvas below the rows
    Root,
}

impl DropTargetId {
    pub fn page_id(&self) -> Option<&str> {
        match self {
            DropTargetId::Page(id) => Some(id),
            DropTargetId::Root => None,
        }
    }
}

/// The currently hovered drop position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTarget {
    pub target: DropTargetId,
    pub zone: DropZone,
}

/// Screen-space rectangle of a row, for leave detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl RowBounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.left + self.width && y >= self.top && y < self.top + self.height
    }
}

/// At most one drag gesture at a time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragSession {
    dragging_id: Option<String>,
    drop_target: Option<DropTarget>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging `id`, abandoning any unresolved session.
    ///
    /// Returns the id that was being dragged before, if any.
    pub fn start(&mut self, id: impl Into<String>) -> Option<String> {
        let previous = self.dragging_id.replace(id.into());
        self.drop_target = None;
        previous
    }

    /// Record the hovered zone over a page row.
    ///
    /// Returns `false` (and changes nothing) when no drag is active or the
    /// row is the dragged page itself.
    pub fn hover(&mut self, target_id: &str, zone: DropZone) -> bool {
        match self.dragging_id.as_deref() {
            Some(dragging) if dragging != target_id => {
                self.drop_target = Some(DropTarget {
                    target: DropTargetId::Page(target_id.to_string()),
                    zone,
                });
                true
            }
            _ => false,
        }
    }

    /// Record a hover over the empty canvas, which always means "append as root"
    pub fn hover_root(&mut self) -> bool {
        if self.dragging_id.is_none() {
            return false;
        }
        self.drop_target = Some(DropTarget {
            target: DropTargetId::Root,
            zone: DropZone::Inner,
        });
        true
    }

    pub fn clear_drop(&mut self) {
        self.drop_target = None;
    }

    /// Clear the drop target only if the pointer really left `bounds`
    ///
    /// Leave events also fire when the pointer crosses into a child element
    /// of the row; those must not clear the target.
    pub fn pointer_left(&mut self, bounds: RowBounds, x: f64, y: f64) -> bool {
        if bounds.contains(x, y) {
            return false;
        }
        self.clear_drop();
        true
    }

    /// End the gesture
    pub fn clear(&mut self) {
        self.dragging_id = None;
        self.drop_target = None;
    }

    pub fn dragging_id(&self) -> Option<&str> {
        self.dragging_id.as_deref()
    }

    pub fn drop_target(&self) -> Option<&DropTarget> {
        self.drop_target.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.dragging_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_quartiles() {
        assert_eq!(DropZone::from_offset(0.0, 40.0, 0.25), DropZone::Before);
        assert_eq!(DropZone::from_offset(9.9, 40.0, 0.25), DropZone::Before);
        assert_eq!(DropZone::from_offset(10.0, 40.0, 0.25), DropZone::Inner);
        assert_eq!(DropZone::from_offset(30.0, 40.0, 0.25), DropZone::Inner);
        assert_eq!(DropZone::from_offset(30.1, 40.0, 0.25), DropZone::After);
        assert_eq!(DropZone::from_offset(39.0, 40.0, 0.25), DropZone::After);
    }

    #[test]
    fn test_zone_degenerate_row_is_inner() {
        assert_eq!(DropZone::from_offset(3.0, 0.0, 0.25), DropZone::Inner);
        assert_eq!(DropZone::from_offset(f64::NAN, 20.0, 0.25), DropZone::Inner);
    }

    #[test]
    fn test_hover_ignores_self() {
        let mut session = DragSession::new();
        session.start("a");
        assert!(!session.hover("a", DropZone::Inner));
        assert!(session.drop_target().is_none());
        assert!(session.hover("b", DropZone::After));
        assert_eq!(
            session.drop_target(),
            Some(&DropTarget {
                target: DropTargetId::Page("b".to_string()),
                zone: DropZone::After,
            })
        );
    }

    #[test]
    fn test_hover_without_drag_is_ignored() {
        let mut session = DragSession::new();
        assert!(!session.hover("b", DropZone::Inner));
        assert!(!session.hover_root());
    }

    #[test]
    fn test_start_replaces_previous_session() {
        let mut session = DragSession::new();
        session.start("a");
        session.hover("b", DropZone::Before);

        let previous = session.start("c");

        assert_eq!(previous.as_deref(), Some("a"));
        assert_eq!(session.dragging_id(), Some("c"));
        assert!(session.drop_target().is_none());
    }

    #[test]
    fn test_pointer_left_uses_bounding_rect() {
        let bounds = RowBounds::new(10.0, 100.0, 200.0, 24.0);
        let mut session = DragSession::new();
        session.start("a");
        session.hover("b", DropZone::Inner);

        // Moving onto a child element inside the row keeps the target
        assert!(!session.pointer_left(bounds, 50.0, 110.0));
        assert!(session.drop_target().is_some());

        // The bottom edge is already outside
        assert!(session.pointer_left(bounds, 50.0, 124.0));
        assert!(session.drop_target().is_none());
        assert!(session.is_active());
    }

    #[test]
    fn test_target_serialization() {
        let json = serde_json::to_value(DropTarget {
            target: DropTargetId::Page("p1".to_string()),
            zone: DropZone::Before,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "target": { "kind": "page", "id": "p1" }, "zone": "before" })
        );
    }
}
