//! Page Tree Engine
//!
//! Owns the sidebar's view of the user's pages: the flat list, which pages
//! are expanded, the drag session, and the ledger of move writes that have
//! been sent to the store but not yet acknowledged.
//!
//! # Optimistic moves
//!
//! A drop is applied to the local list immediately. The matching store write
//! runs on a spawned task and the caller never waits for it. Each write is a
//! [`MoveCommand`] stamped with a sequence number that increases with every
//! command the engine issues. When acknowledgements come back,
//! [`PageTreeEngine::reconcile`] drops any that are older than the latest
//! command for the same page, so a slow early write can never be mistaken
//! for the current state. The store also receives the sequence and refuses a
//! write older than one it has already applied.
//!
//! A failed write is logged and the page is marked unconfirmed. Local state
//! is not rolled back; the next [`PageTreeEngine::refresh`] replaces it with
//! what the store holds.
//!
//! # Threading
//!
//! Single writer: every mutation takes `&mut self`. `commit_drop` and
//! `renormalize_siblings` must be called from within a tokio runtime because
//! they spawn the store writes.

use super::PageServiceError;
use crate::config::WorkspaceConfig;
use crate::db::{FractionalOrderCalculator, PageStore, StoreError};
use crate::models::{DocumentContent, NewPage, Page, PageUpdate};
use crate::tree::{
    append_position, build_forest, compute_placement, flatten_visible, sorted_siblings,
    DragSession, DropRejection, DropTarget, DropTargetId, DropZone, PageTreeNode, RowBounds,
    VisibleRow,
};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A parent/position write for one page, stamped for ordering
#[derive(Debug, Clone, PartialEq)]
pub struct MoveCommand {
    pub page_id: String,
    pub parent_id: Option<String>,
    pub position: f64,
    pub sequence: u64,
}

impl MoveCommand {
    fn to_update(&self) -> PageUpdate {
        PageUpdate::new()
            .with_parent(self.parent_id.clone())
            .with_position(self.position)
            .with_sequence(self.sequence)
    }
}

/// Result of [`PageTreeEngine::commit_drop`]
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Applied locally; the write has been sent
    Moved(MoveCommand),
    /// Nothing changed
    Rejected(DropRejection),
}

impl DropOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, DropOutcome::Moved(_))
    }
}

/// Acknowledgement sent back by a spawned write
#[derive(Debug)]
struct WriteAck {
    page_id: String,
    sequence: u64,
    result: Result<Page, StoreError>,
}

/// What one [`PageTreeEngine::reconcile`] pass found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    /// Pages whose latest write succeeded
    pub confirmed: Vec<String>,
    /// Pages whose latest write failed
    pub failed: Vec<String>,
    /// Acknowledgements dropped because a newer write for the page exists
    /// or the page has since been deleted
    pub stale: usize,
}

pub struct PageTreeEngine {
    store: Arc<dyn PageStore>,
    config: WorkspaceConfig,

    pages: Vec<Page>,
    loading: bool,
    expanded: HashSet<String>,
    drag: DragSession,

    next_sequence: u64,
    latest_sequence: HashMap<String, u64>,
    unconfirmed: HashSet<String>,
    ack_tx: mpsc::UnboundedSender<WriteAck>,
    ack_rx: mpsc::UnboundedReceiver<WriteAck>,
    in_flight: Vec<JoinHandle<()>>,
}

impl PageTreeEngine {
    pub fn new(store: Arc<dyn PageStore>, config: WorkspaceConfig) -> Self {
        let (ack_tx, ack_rx) = mpsc::unbounded_channel();
        Self {
            store,
            config,
            pages: Vec::new(),
            loading: false,
            expanded: HashSet::new(),
            drag: DragSession::new(),
            // Wall-clock seed so a later session outranks an earlier one at the store
            next_sequence: Utc::now().timestamp_micros().max(0) as u64,
            latest_sequence: HashMap::new(),
            unconfirmed: HashSet::new(),
            ack_tx,
            ack_rx,
            in_flight: Vec::new(),
        }
    }

    //
    // READ ACCESS
    //

    /// Flat list, sorted by position
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PageStore> {
        &self.store
    }

    /// The derived forest (`buildTree`)
    pub fn forest(&self) -> Vec<PageTreeNode> {
        build_forest(&self.pages)
    }

    /// Rows the sidebar currently shows
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        flatten_visible(&self.forest(), &self.expanded)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn dragging_id(&self) -> Option<&str> {
        self.drag.dragging_id()
    }

    pub fn drop_target(&self) -> Option<&DropTarget> {
        self.drag.drop_target()
    }

    /// Whether the latest write for this page failed and no refresh has happened since
    pub fn is_unconfirmed(&self, id: &str) -> bool {
        self.unconfirmed.contains(id)
    }

    /// Spawned writes that have not finished yet
    pub fn pending_writes(&self) -> usize {
        self.in_flight.iter().filter(|h| !h.is_finished()).count()
    }

    //
    // LOADING
    //

    /// Replace the local list with the store's rows for `user_id`.
    ///
    /// On failure the error is logged and the current (possibly stale) list
    /// is kept.
    pub async fn refresh(&mut self, user_id: &str) -> Result<usize, PageServiceError> {
        self.loading = true;
        let result = self.store.list_pages(user_id).await;
        self.loading = false;

        let mut pages = result.map_err(|e| {
            tracing::error!("Error fetching pages for user '{}': {}", user_id, e);
            e
        })?;
        sort_pages(&mut pages);
        self.pages = pages;
        self.unconfirmed.clear();

        let pages = &self.pages;
        self.expanded
            .retain(|id| pages.iter().any(|page| &page.id == id));

        tracing::debug!("Loaded {} pages for user '{}'", self.pages.len(), user_id);
        Ok(self.pages.len())
    }

    //
    // EXPANSION
    //

    /// Flip whether `id` shows its children; returns the new state
    pub fn toggle_expanded(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    //
    // DRAG AND DROP
    //

    /// `startDrag`: begin dragging `id`, abandoning any earlier session
    pub fn start_drag(&mut self, id: &str) {
        if let Some(previous) = self.drag.start(id) {
            tracing::debug!("Abandoning drag of '{}' for '{}'", previous, id);
        }
    }

    /// `hoverDrop`: record the zone under the pointer over row `target_id`.
    ///
    /// Returns the zone, or `None` when nothing was recorded (no drag, or the
    /// row is the dragged page).
    pub fn hover_drop(
        &mut self,
        target_id: &str,
        pointer_offset: f64,
        row_height: f64,
    ) -> Option<DropZone> {
        let zone = DropZone::from_offset(pointer_offset, row_height, self.config.drop_edge_fraction);
        self.drag.hover(target_id, zone).then_some(zone)
    }

    /// Hover over the empty canvas below the rows
    pub fn hover_root(&mut self) -> bool {
        self.drag.hover_root()
    }

    /// `clearDrop`
    pub fn clear_drop(&mut self) {
        self.drag.clear_drop();
    }

    /// `clearDrop` for a leave event: clears only if the pointer is outside `bounds`
    pub fn pointer_left(&mut self, bounds: RowBounds, x: f64, y: f64) -> bool {
        self.drag.pointer_left(bounds, x, y)
    }

    /// Drag ended without a drop
    pub fn cancel_drag(&mut self) {
        self.drag.clear();
    }

    /// `commitDrop`: finish the gesture on `target` (`None` for the empty canvas).
    ///
    /// On success the dragged page is moved locally, the store write is
    /// spawned, and the new parent is expanded. Drag state is cleared in every
    /// case.
    pub fn commit_drop(&mut self, target: Option<&str>) -> DropOutcome {
        let outcome = match self.resolve_drop(target) {
            Ok(command) => {
                self.spawn_write(command.clone());
                DropOutcome::Moved(command)
            }
            Err(rejection) => {
                tracing::debug!("Drop ignored: {}", rejection);
                DropOutcome::Rejected(rejection)
            }
        };
        self.drag.clear();
        outcome
    }

    fn resolve_drop(&mut self, target: Option<&str>) -> Result<MoveCommand, DropRejection> {
        let dragged_id = self
            .drag
            .dragging_id()
            .ok_or(DropRejection::NoActiveDrag)?
            .to_string();
        let zone = self
            .drag
            .drop_target()
            .ok_or(DropRejection::NoDropZone)?
            .zone;

        let target_id = match target {
            Some(id) if id == dragged_id => return Err(DropRejection::SelfDrop(dragged_id)),
            Some(id) => DropTargetId::Page(id.to_string()),
            None => DropTargetId::Root,
        };

        let placement = compute_placement(&self.pages, &dragged_id, &target_id, zone)?;

        self.apply_local_move(&dragged_id, placement.parent_id.clone(), placement.position);
        if let Some(parent_id) = &placement.parent_id {
            self.expanded.insert(parent_id.clone());
        }
        self.warn_if_collapsed(placement.parent_id.as_deref());

        tracing::debug!(
            "Moved '{}' under {:?} at {}",
            dragged_id,
            placement.parent_id,
            placement.position
        );

        Ok(MoveCommand {
            sequence: self.issue_sequence(&dragged_id),
            page_id: dragged_id,
            parent_id: placement.parent_id,
            position: placement.position,
        })
    }

    //
    // RECONCILIATION
    //

    /// Drain the acknowledgements that have arrived so far.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        while let Ok(ack) = self.ack_rx.try_recv() {
            // No entry means the page was deleted after the write was sent
            let Some(latest) = self.latest_sequence.get(&ack.page_id).copied() else {
                tracing::debug!("Dropping acknowledgement for deleted page '{}'", ack.page_id);
                report.stale += 1;
                continue;
            };
            if ack.sequence < latest {
                tracing::debug!(
                    "Dropping stale acknowledgement for '{}' (sequence {}, latest {})",
                    ack.page_id,
                    ack.sequence,
                    latest
                );
                report.stale += 1;
                continue;
            }

            match ack.result {
                Ok(_) => {
                    self.unconfirmed.remove(&ack.page_id);
                    report.confirmed.push(ack.page_id);
                }
                Err(_) => {
                    self.unconfirmed.insert(ack.page_id.clone());
                    report.failed.push(ack.page_id);
                }
            }
        }

        self.in_flight.retain(|handle| !handle.is_finished());
        report
    }

    /// Wait for every spawned write, then reconcile
    pub async fn settle(&mut self) -> ReconcileReport {
        for handle in std::mem::take(&mut self.in_flight) {
            if let Err(e) = handle.await {
                tracing::error!("Page write task failed: {}", e);
            }
        }
        self.reconcile()
    }

    fn issue_sequence(&mut self, page_id: &str) -> u64 {
        self.next_sequence += 1;
        self.latest_sequence
            .insert(page_id.to_string(), self.next_sequence);
        self.next_sequence
    }

    fn spawn_write(&mut self, command: MoveCommand) {
        let store = Arc::clone(&self.store);
        let ack_tx = self.ack_tx.clone();

        let handle = tokio::spawn(async move {
            let result = store
                .update_page(&command.page_id, command.to_update())
                .await;

            match &result {
                Ok(_) => {}
                Err(e) if e.is_stale() => {
                    tracing::debug!("Store refused out-of-order write: {}", e);
                }
                Err(e) => {
                    tracing::error!("Error moving page '{}': {}", command.page_id, e);
                }
            }

            // Receiver lives as long as the engine; a closed channel means it was dropped
            let _ = ack_tx.send(WriteAck {
                page_id: command.page_id,
                sequence: command.sequence,
                result,
            });
        });

        self.in_flight.retain(|handle| !handle.is_finished());
        self.in_flight.push(handle);
    }

    fn apply_local_move(&mut self, id: &str, parent_id: Option<String>, position: f64) {
        if let Some(page) = self.pages.iter_mut().find(|page| page.id == id) {
            page.parent_id = parent_id;
            page.position = position;
        }
        sort_pages(&mut self.pages);
    }

    fn warn_if_collapsed(&self, parent_id: Option<&str>) {
        let positions: Vec<f64> = sorted_siblings(&self.pages, parent_id, None)
            .iter()
            .map(|page| page.position)
            .collect();
        if FractionalOrderCalculator::needs_rebalancing(
            &positions,
            self.config.rebalance_gap_threshold,
        ) {
            tracing::warn!(
                "Sibling positions under {:?} are closer than {}; ordering may become ambiguous until renormalized",
                parent_id,
                self.config.rebalance_gap_threshold
            );
        }
    }

    /// Renumber the children of `parent_id` to `0, 1, 2, ..` in their current order.
    ///
    /// Never run implicitly. Writes only the pages whose position changes and
    /// returns the commands sent.
    pub fn renormalize_siblings(&mut self, parent_id: Option<&str>) -> Vec<MoveCommand> {
        let ordered: Vec<(String, f64)> = sorted_siblings(&self.pages, parent_id, None)
            .iter()
            .map(|page| (page.id.clone(), page.position))
            .collect();
        let fresh = FractionalOrderCalculator::rebalance(ordered.len());

        let mut commands = Vec::new();
        for ((id, old), new) in ordered.into_iter().zip(fresh) {
            if old == new {
                continue;
            }
            self.apply_local_move(&id, parent_id.map(String::from), new);
            commands.push(MoveCommand {
                sequence: self.issue_sequence(&id),
                page_id: id,
                parent_id: parent_id.map(String::from),
                position: new,
            });
        }

        for command in &commands {
            self.spawn_write(command.clone());
        }
        tracing::info!(
            "Renormalized {} sibling positions under {:?}",
            commands.len(),
            parent_id
        );
        commands
    }

    //
    // PAGE LIFECYCLE
    //

    /// Create an untitled page as the last child of `parent_id` (root when `None`).
    pub async fn create_page(
        &mut self,
        user_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, PageServiceError> {
        if let Some(parent_id) = parent_id {
            if self.page(parent_id).is_none() {
                return Err(PageServiceError::invalid_parent(parent_id));
            }
        }

        let position = append_position(&self.pages, parent_id, None);
        let new_page = NewPage::new(user_id, parent_id.map(String::from), position);
        self.insert_page(new_page).await
    }

    /// Create a root page with a title and document, appended after the last root
    pub async fn create_root_page_with(
        &mut self,
        user_id: &str,
        title: &str,
        content: DocumentContent,
    ) -> Result<Page, PageServiceError> {
        let position = append_position(&self.pages, None, None);
        let new_page = NewPage::new(user_id, None, position)
            .with_title(title)
            .with_content(content);
        self.insert_page(new_page).await
    }

    async fn insert_page(&mut self, new_page: NewPage) -> Result<Page, PageServiceError> {
        new_page.validate()?;
        let created = self.store.create_page(new_page).await?;

        if let Some(parent_id) = &created.parent_id {
            self.expanded.insert(parent_id.clone());
        }
        self.pages.push(created.clone());
        sort_pages(&mut self.pages);

        tracing::debug!("Created page '{}'", created.id);
        Ok(created)
    }

    /// Rename a page; the local title changes only after the store accepts it
    pub async fn rename_page(&mut self, id: &str, title: &str) -> Result<Page, PageServiceError> {
        self.save_page(id, PageUpdate::new().with_title(title)).await
    }

    /// Persist title and document together
    pub async fn save_content(
        &mut self,
        id: &str,
        title: &str,
        content: DocumentContent,
    ) -> Result<Page, PageServiceError> {
        self.save_page(id, PageUpdate::new().with_title(title).with_content(content))
            .await
    }

    async fn save_page(&mut self, id: &str, update: PageUpdate) -> Result<Page, PageServiceError> {
        if self.page(id).is_none() {
            return Err(PageServiceError::page_not_found(id));
        }
        update.validate_for(id)?;

        let saved = self.store.update_page(id, update.clone()).await?;
        if let Some(page) = self.pages.iter_mut().find(|page| page.id == id) {
            page.apply(&update);
        }
        Ok(saved)
    }

    /// Delete a page and its subtree once `confirm` approves it.
    ///
    /// Returns `Ok(None)` when the confirmation declined (no store call is
    /// made), otherwise every removed id, the page itself first.
    pub async fn delete_page<F>(
        &mut self,
        id: &str,
        confirm: F,
    ) -> Result<Option<Vec<String>>, PageServiceError>
    where
        F: FnOnce(&Page) -> bool,
    {
        let page = self
            .page(id)
            .ok_or_else(|| PageServiceError::page_not_found(id))?;
        if !confirm(page) {
            tracing::debug!("Deletion of '{}' not confirmed", id);
            return Ok(None);
        }

        let result = self.store.delete_page(id).await?;

        let mut removed = self.local_subtree(id);
        for remote_id in result.removed_ids {
            if !removed.contains(&remote_id) {
                removed.push(remote_id);
            }
        }

        let gone: HashSet<&str> = removed.iter().map(String::as_str).collect();
        self.pages.retain(|page| !gone.contains(page.id.as_str()));
        self.expanded.retain(|id| !gone.contains(id.as_str()));
        self.latest_sequence
            .retain(|id, _| !gone.contains(id.as_str()));
        self.unconfirmed.retain(|id| !gone.contains(id.as_str()));
        if self
            .drag
            .dragging_id()
            .is_some_and(|dragging| gone.contains(dragging))
        {
            self.drag.clear();
        }

        tracing::debug!("Deleted page '{}' and {} descendants", id, removed.len() - 1);
        Ok(Some(removed))
    }

    /// `id` followed by all of its local descendants, breadth-first
    fn local_subtree(&self, id: &str) -> Vec<String> {
        let mut subtree = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < subtree.len() {
            let parent = subtree[cursor].clone();
            for page in &self.pages {
                if page.parent_id.as_deref() == Some(parent.as_str()) && !subtree.contains(&page.id)
                {
                    subtree.push(page.id.clone());
                }
            }
            cursor += 1;
        }
        subtree
    }
}

/// Stable sort by position; equal positions keep their current order
fn sort_pages(pages: &mut [Page]) {
    pages.sort_by(|a, b| a.position.total_cmp(&b.position));
}
