//! In-memory collaborators for testing.
//!
//! These keep everything in process memory and can be told to fail a number
//! of upcoming calls, which is enough to exercise the consumer's retry paths
//! without a real database or sink.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use async_trait::async_trait;
use seqlog_core::{Event, Sequence};
use tokio::sync::{Mutex, RwLock, watch};

use crate::error::{Result, TailError};
use crate::traits::{CursorRepository, EventSink, PublisherId};

/// Consume one pending injected failure, if any.
fn take_failure(pending: &AtomicU32) -> bool {
    pending
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// In-memory implementation of [`CursorRepository`].
pub struct InMemoryRepository<P> {
    /// Stored events, kept in sequence order
    events: RwLock<Vec<Event<P>>>,
    /// Persisted cursors
    cursors: RwLock<HashMap<PublisherId, Sequence>>,
    /// Every `events_from_sequence` call as `(from, limit)`
    range_reads: Mutex<Vec<(Sequence, u64)>>,
    saves: AtomicUsize,
    failing_loads: AtomicU32,
    failing_saves: AtomicU32,
    failing_reads: AtomicU32,
}

impl<P> InMemoryRepository<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            cursors: RwLock::new(HashMap::new()),
            range_reads: Mutex::new(Vec::new()),
            saves: AtomicUsize::new(0),
            failing_loads: AtomicU32::new(0),
            failing_saves: AtomicU32::new(0),
            failing_reads: AtomicU32::new(0),
        }
    }

    /// Create a repository already holding `events`.
    #[must_use]
    pub fn with_events(events: Vec<Event<P>>) -> Self {
        Self {
            events: RwLock::new(events),
            ..Self::new()
        }
    }

    /// Store an event. Events must arrive in sequence order.
    pub async fn append(&self, event: Event<P>) {
        self.events.write().await.push(event);
    }

    /// Set the persisted cursor for `id`.
    pub async fn set_cursor(&self, id: PublisherId, sequence: Sequence) {
        self.cursors.write().await.insert(id, sequence);
    }

    /// Persisted cursor for `id`, if one was ever saved.
    pub async fn cursor(&self, id: PublisherId) -> Option<Sequence> {
        self.cursors.read().await.get(&id).copied()
    }

    /// All range reads served so far, as `(from, limit)`.
    pub async fn range_reads(&self) -> Vec<(Sequence, u64)> {
        self.range_reads.lock().await.clone()
    }

    /// Number of successful cursor writes.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Fail the next `n` cursor loads.
    pub fn fail_next_loads(&self, n: u32) {
        self.failing_loads.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` cursor writes.
    pub fn fail_next_saves(&self, n: u32) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` range reads.
    pub fn fail_next_reads(&self, n: u32) {
        self.failing_reads.store(n, Ordering::SeqCst);
    }
}

impl<P> Default for InMemoryRepository<P>
where
    P: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<P> CursorRepository<P> for InMemoryRepository<P>
where
    P: Clone + Send + Sync + 'static,
{
    async fn last_sequence(&self, id: PublisherId) -> Result<Sequence> {
        if take_failure(&self.failing_loads) {
            return Err(TailError::Repository(format!("cursor load failed for {id}")));
        }
        Ok(self.cursor(id).await.unwrap_or(0))
    }

    async fn save_last_sequence(&self, id: PublisherId, sequence: Sequence) -> Result<()> {
        if take_failure(&self.failing_saves) {
            return Err(TailError::Repository(format!("cursor save failed for {id}")));
        }
        self.set_cursor(id, sequence).await;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn events_from_sequence(&self, from: Sequence, limit: u64) -> Result<Vec<Event<P>>> {
        self.range_reads.lock().await.push((from, limit));
        if take_failure(&self.failing_reads) {
            return Err(TailError::Repository(format!("range read from {from} failed")));
        }

        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.sequence >= from)
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

/// [`EventSink`] that records every delivered batch.
pub struct RecordingSink<P> {
    batches: Mutex<Vec<Vec<Event<P>>>>,
    /// Highest sequence delivered so far
    high_water: watch::Sender<Sequence>,
    attempts: AtomicUsize,
    failing: AtomicU32,
}

impl<P> RecordingSink<P>
where
    P: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        let (high_water, _) = watch::channel(0);
        Self {
            batches: Mutex::new(Vec::new()),
            high_water,
            attempts: AtomicUsize::new(0),
            failing: AtomicU32::new(0),
        }
    }

    /// Every successfully delivered batch, including empty ones.
    pub async fn batches(&self) -> Vec<Vec<Event<P>>> {
        self.batches.lock().await.clone()
    }

    /// All delivered events in delivery order.
    pub async fn delivered(&self) -> Vec<Event<P>> {
        self.batches.lock().await.iter().flatten().cloned().collect()
    }

    /// Number of publish calls, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Fail the next `n` publish calls.
    pub fn fail_next(&self, n: u32) {
        self.failing.store(n, Ordering::SeqCst);
    }

    /// Wait until an event with at least `sequence` has been delivered.
    pub async fn wait_for(&self, sequence: Sequence) {
        let mut rx = self.high_water.subscribe();
        // The sender lives as long as `self`.
        let _ = rx.wait_for(|delivered| *delivered >= sequence).await;
    }
}

impl<P> Default for RecordingSink<P>
where
    P: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<P> EventSink<P> for RecordingSink<P>
where
    P: Clone + Send + Sync + 'static,
{
    async fn publish(&self, events: &[Event<P>]) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.failing) {
            return Err(TailError::Sink("injected sink failure".to_string()));
        }

        self.batches.lock().await.push(events.to_vec());
        if let Some(last) = events.last() {
            self.high_water.send_if_modified(|delivered| {
                let advanced = last.sequence > *delivered;
                if advanced {
                    *delivered = last.sequence;
                }
                advanced
            });
        }
        Ok(())
    }
}
