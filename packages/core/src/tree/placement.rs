//! Position and parent computation for a drop
//!
//! Given the flat page list, the dragged page and where it was dropped, this
//! decides the new `parent_id` and `position`, or why the drop is refused.
//! Nothing here mutates state; the engine applies the result.

use super::drag::{DropTargetId, DropZone};
use crate::db::FractionalOrderCalculator;
use crate::models::Page;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// New location of a dragged page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub parent_id: Option<String>,
    pub position: f64,
}

/// Why a drop was refused
///
/// These are never shown to the user; the drop simply does nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropRejection {
    #[error("no drag in progress")]
    NoActiveDrag,

    #[error("no drop zone recorded")]
    NoDropZone,

    #[error("page '{0}' dropped onto itself")]
    SelfDrop(String),

    #[error("page '{dragged}' cannot move under its own descendant '{target}'")]
    Cycle { dragged: String, target: String },

    #[error("page '{0}' is not in the local list")]
    UnknownPage(String),

    #[error("no finite position left for page '{0}'")]
    NonFinitePosition(String),
}

/// Whether `ancestor_id` appears on the parent chain above `page_id`
///
/// A page is not its own descendant. The walk stops on a repeated id, so
/// corrupt cyclic input terminates.
pub fn is_descendant(pages: &[Page], ancestor_id: &str, page_id: &str) -> bool {
    let parents: HashMap<&str, Option<&str>> = pages
        .iter()
        .map(|page| (page.id.as_str(), page.parent_id.as_deref()))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = parents.get(page_id).copied().flatten();
    while let Some(id) = current {
        if id == ancestor_id {
            return true;
        }
        if !seen.insert(id) {
            break;
        }
        current = parents.get(id).copied().flatten();
    }
    false
}

/// Compute where `dragged_id` lands when dropped on `target` in `zone`.
///
/// - Root canvas: last root, `max(root positions) + 1`, or `0` when there are none
/// - `Inner`: last child of the target, `max(child positions) + 1`, or `0`
/// - `Before`/`After`: sibling of the target, at the midpoint with the
///   neighbour on that side, or one unit past the target when there is none
///
/// The dragged page is excluded from every sibling set it is compared with.
/// A computed position that is not finite is refused; the sibling set has to
/// be renormalized first.
pub fn compute_placement(
    pages: &[Page],
    dragged_id: &str,
    target: &DropTargetId,
    zone: DropZone,
) -> Result<Placement, DropRejection> {
    let placement = place(pages, dragged_id, target, zone)?;
    if !placement.position.is_finite() {
        return Err(DropRejection::NonFinitePosition(dragged_id.to_string()));
    }
    Ok(placement)
}

fn place(
    pages: &[Page],
    dragged_id: &str,
    target: &DropTargetId,
    zone: DropZone,
) -> Result<Placement, DropRejection> {
    if !pages.iter().any(|page| page.id == dragged_id) {
        return Err(DropRejection::UnknownPage(dragged_id.to_string()));
    }

    let target_id = match target {
        DropTargetId::Root => {
            return Ok(Placement {
                parent_id: None,
                position: append_position(pages, None, Some(dragged_id)),
            });
        }
        DropTargetId::Page(id) => id.as_str(),
    };

    if target_id == dragged_id {
        return Err(DropRejection::SelfDrop(dragged_id.to_string()));
    }

    let target_page = pages
        .iter()
        .find(|page| page.id == target_id)
        .ok_or_else(|| DropRejection::UnknownPage(target_id.to_string()))?;

    if is_descendant(pages, dragged_id, target_id) {
        return Err(DropRejection::Cycle {
            dragged: dragged_id.to_string(),
            target: target_id.to_string(),
        });
    }

    match zone {
        DropZone::Inner => Ok(Placement {
            parent_id: Some(target_id.to_string()),
            position: append_position(pages, Some(target_id), Some(dragged_id)),
        }),
        DropZone::Before | DropZone::After => {
            let parent_id = target_page.parent_id.as_deref();
            let siblings = sorted_siblings(pages, parent_id, Some(dragged_id));
            let index = siblings
                .iter()
                .position(|page| page.id == target_id)
                .ok_or_else(|| DropRejection::UnknownPage(target_id.to_string()))?;

            let position = if zone == DropZone::Before {
                let prev = index
                    .checked_sub(1)
                    .and_then(|i| siblings.get(i))
                    .map(|page| page.position);
                FractionalOrderCalculator::before(prev, target_page.position)
            } else {
                let next = siblings.get(index + 1).map(|page| page.position);
                FractionalOrderCalculator::after(target_page.position, next)
            };

            Ok(Placement {
                parent_id: parent_id.map(String::from),
                position,
            })
        }
    }
}

/// Position for appending a page as the last child of `parent_id`
///
/// `exclude_id`, when given, is left out of the sibling set (the page being moved).
pub fn append_position(pages: &[Page], parent_id: Option<&str>, exclude_id: Option<&str>) -> f64 {
    let max = pages
        .iter()
        .filter(|page| Some(page.id.as_str()) != exclude_id)
        .filter(|page| page.parent_id.as_deref() == parent_id)
        .map(|page| page.position)
        .fold(None, |acc: Option<f64>, position| {
            Some(acc.map_or(position, |max| max.max(position)))
        });
    FractionalOrderCalculator::append_after(max)
}

/// Siblings under `parent_id` sorted by position, ties in list order
pub fn sorted_siblings<'a>(
    pages: &'a [Page],
    parent_id: Option<&str>,
    exclude_id: Option<&str>,
) -> Vec<&'a Page> {
    let mut siblings: Vec<&Page> = pages
        .iter()
        .filter(|page| Some(page.id.as_str()) != exclude_id)
        .filter(|page| page.parent_id.as_deref() == parent_id)
        .collect();
    siblings.sort_by(|a, b| a.position.total_cmp(&b.position));
    siblings
}
