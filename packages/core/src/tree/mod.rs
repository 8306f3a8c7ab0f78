//! Page Tree
//!
//! Pure tree logic with no I/O:
//!
//! - [`forest`] - builds the forest from flat rows
//! - [`drag`] - drag session state and drop-zone geometry
//! - [`placement`] - new parent/position for a drop, cycle detection
//!
//! The stateful engine that combines these with the store lives in
//! [`crate::services::PageTreeEngine`].

pub mod drag;
pub mod forest;
pub mod placement;

pub use drag::{DragSession, DropTarget, DropTargetId, DropZone, RowBounds};
pub use forest::{build_forest, flatten_visible, ChildIndex, PageTreeNode, VisibleRow};
pub use placement::{
    append_position, compute_placement, is_descendant, sorted_siblings, DropRejection, Placement,
};
