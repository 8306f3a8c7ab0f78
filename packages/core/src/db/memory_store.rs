//! InMemoryPageStore - PageStore implementation backed by process memory
//!
//! Reference implementation of the persistence contract. Used by tests, the
//! dev tool and anywhere a hosted backend is not available.
//!
//! Besides plain CRUD it can:
//!
//! - emit [`DomainEvent`]s on a broadcast channel after each applied write
//! - fail the next N writes, or every call while "offline"
//! - delay individual writes, so two writes issued in order can land out of order
//! - refuse sequenced writes older than the last one applied to the same page

use super::{DomainEvent, PageStore, StoreError};
use crate::models::{DeleteResult, NewPage, Page, PageUpdate};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct InMemoryPageStore {
    /// Rows in insertion order; list ordering ties fall back to this order
    pages: RwLock<Vec<Page>>,

    /// Highest sequence applied per page id
    applied_sequences: RwLock<HashMap<String, u64>>,

    failing_writes: AtomicUsize,
    offline: AtomicBool,
    write_latencies: Mutex<VecDeque<Duration>>,

    event_tx: broadcast::Sender<DomainEvent>,
}

impl InMemoryPageStore {
    pub fn new() -> Self {
        Self::with_pages(Vec::new())
    }

    /// Seed the store with existing rows, kept in the given order
    pub fn with_pages(pages: Vec<Page>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            pages: RwLock::new(pages),
            applied_sequences: RwLock::new(HashMap::new()),
            failing_writes: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
            write_latencies: Mutex::new(VecDeque::new()),
            event_tx,
        }
    }

    /// Subscribe to domain events for every applied write
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Make the next `count` writes fail with `StoreError::Unavailable`
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// While offline every call, reads included, fails
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Queue a delay for the next write; each write pops one delay
    pub fn push_write_latency(&self, latency: Duration) {
        if let Ok(mut queue) = self.write_latencies.lock() {
            queue.push_back(latency);
        }
    }

    /// Snapshot of every row regardless of owner
    pub async fn snapshot(&self) -> Vec<Page> {
        self.pages.read().await.clone()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("store is offline"));
        }
        Ok(())
    }

    /// Simulated network leg of a write: latency first, then injected failures
    async fn begin_write(&self) -> Result<(), StoreError> {
        let latency = self
            .write_latencies
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        self.check_online()?;

        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::unavailable("injected write failure"));
        }
        Ok(())
    }

    fn emit(&self, event: DomainEvent) {
        tracing::trace!("Store event {} for '{}'", event.event_type(), event.page_id());
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Default for InMemoryPageStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_by_position(pages: &mut [Page]) {
    pages.sort_by(|a, b| a.position.total_cmp(&b.position));
}

#[async_trait]
impl PageStore for InMemoryPageStore {
    async fn list_pages(&self, user_id: &str) -> Result<Vec<Page>, StoreError> {
        self.check_online()?;
        let pages = self.pages.read().await;
        let mut owned: Vec<Page> = pages
            .iter()
            .filter(|page| page.user_id == user_id)
            .cloned()
            .collect();
        sort_by_position(&mut owned);
        Ok(owned)
    }

    async fn get_page(&self, id: &str) -> Result<Option<Page>, StoreError> {
        self.check_online()?;
        let pages = self.pages.read().await;
        Ok(pages.iter().find(|page| page.id == id).cloned())
    }

    async fn create_page(&self, page: NewPage) -> Result<Page, StoreError> {
        page.validate()?;
        self.begin_write().await?;

        let created = Page::from_new(page);
        self.pages.write().await.push(created.clone());
        self.emit(DomainEvent::PageCreated(created.clone()));
        Ok(created)
    }

    async fn update_page(&self, id: &str, update: PageUpdate) -> Result<Page, StoreError> {
        update.validate_for(id)?;
        self.begin_write().await?;

        let mut pages = self.pages.write().await;
        let page = pages
            .iter_mut()
            .find(|page| page.id == id)
            .ok_or_else(|| StoreError::not_found(id))?;

        if let Some(incoming) = update.sequence {
            let mut applied = self.applied_sequences.write().await;
            if let Some(&last) = applied.get(id) {
                if incoming <= last {
                    return Err(StoreError::StaleWrite {
                        id: id.to_string(),
                        incoming,
                        applied: last,
                    });
                }
            }
            applied.insert(id.to_string(), incoming);
        }

        page.apply(&update);
        let updated = page.clone();
        drop(pages);

        self.emit(DomainEvent::PageUpdated(updated.clone()));
        Ok(updated)
    }

    async fn delete_page(&self, id: &str) -> Result<DeleteResult, StoreError> {
        self.begin_write().await?;

        let mut pages = self.pages.write().await;
        if !pages.iter().any(|page| page.id == id) {
            return Ok(DeleteResult::not_found());
        }

        // Breadth-first so the page itself comes first
        let mut removed = vec![id.to_string()];
        let mut seen: HashSet<String> = removed.iter().cloned().collect();
        let mut cursor = 0;
        while cursor < removed.len() {
            let parent = removed[cursor].clone();
            for page in pages.iter() {
                if page.parent_id.as_deref() == Some(parent.as_str()) && seen.insert(page.id.clone())
                {
                    removed.push(page.id.clone());
                }
            }
            cursor += 1;
        }

        pages.retain(|page| !seen.contains(&page.id));
        drop(pages);

        let mut applied = self.applied_sequences.write().await;
        for removed_id in &removed {
            applied.remove(removed_id);
        }
        drop(applied);

        for removed_id in &removed {
            self.emit(DomainEvent::PageDeleted {
                id: removed_id.clone(),
            });
        }
        Ok(DeleteResult::removed(removed))
    }

    async fn search_pages(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Page>, StoreError> {
        self.check_online()?;
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let pages = self.pages.read().await;
        let results = pages
            .iter()
            .filter(|page| page.user_id == user_id)
            .filter(|page| {
                page.title.to_lowercase().contains(&needle)
                    || page.content.plain_text().to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect();
        Ok(results)
    }
}
