//! The tailing consumer loop.
//!
//! Each iteration runs strictly in order:
//!
//! ```text
//! fetch [cursor+1, cursor+batch] from the log
//!     └─ existed == false ─▶ read the same window from the repository
//! publish the batch to the sink
//!     └─ empty ─▶ next iteration, cursor unchanged
//! cursor = last sequence in batch, persist it
//! ```
//!
//! Repository and sink failures are logged and retried after a fixed backoff
//! until shutdown. Nothing is pipelined, so a slow sink throttles the loop.

use std::sync::Arc;

use seqlog_core::{Event, EventLog, FetchResponse, Sequence};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::config::TailConfig;
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::traits::{CursorRepository, EventSink, PublisherId};

/// Moves events from an [`EventLog`] into an [`EventSink`], resuming from a
/// cursor persisted in a [`CursorRepository`].
pub struct TailingConsumer<P> {
    log: EventLog<P>,
    repository: Arc<dyn CursorRepository<P>>,
    sink: Arc<dyn EventSink<P>>,
    publisher_id: PublisherId,
    batch_size: u64,
    retry: RetryPolicy,
}

impl<P> TailingConsumer<P>
where
    P: Clone + Send + Sync + 'static,
{
    /// Create a consumer. Fails if `config` is invalid.
    pub fn new(
        log: EventLog<P>,
        repository: Arc<dyn CursorRepository<P>>,
        sink: Arc<dyn EventSink<P>>,
        config: &TailConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            log,
            repository,
            sink,
            publisher_id: config.publisher_id,
            batch_size: config.batch_size,
            retry: config.retry_policy(),
        })
    }

    /// Run the consumer on a new tokio task.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    /// Tail the log until `shutdown` fires.
    ///
    /// Returns `Ok(())` on shutdown. Repository and sink errors never end the
    /// loop; only a failure of the event log itself is returned.
    #[instrument(skip_all, fields(publisher = %self.publisher_id))]
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        info!("Tailing consumer started");

        let Some(mut cursor) = self.load_cursor(&shutdown).await else {
            info!("Tailing consumer stopped before loading its cursor");
            return Ok(());
        };
        info!(cursor, "Resuming from persisted cursor");

        let mut batch: Vec<Event<P>> = Vec::new();

        loop {
            let from = cursor.saturating_add(1);
            batch.clear();

            let response = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                response = self.log.fetch_range(from, self.batch_size, std::mem::take(&mut batch)) => response?,
            };

            let FetchResponse { existed, result } = response;
            batch = result;

            if !existed {
                debug!(from, "Range not retained by the log, reading repository");
                match self
                    .repository
                    .events_from_sequence(from, self.batch_size)
                    .await
                {
                    Ok(events) => batch = events,
                    Err(e) => {
                        warn!(from, error = %e, "Repository range read failed");
                        if !self.retry.wait(&shutdown).await {
                            break;
                        }
                        continue;
                    }
                }
            }

            if let Err(e) = self.sink.publish(&batch).await {
                warn!(from, count = batch.len(), error = %e, "Sink publish failed");
                if !self.retry.wait(&shutdown).await {
                    break;
                }
                continue;
            }

            let Some(last) = batch.last() else {
                trace!(from, "Empty batch, continuing");
                continue;
            };

            cursor = last.sequence;
            debug!(count = batch.len(), cursor, "Batch delivered");

            if !self.save_cursor(cursor, &shutdown).await {
                break;
            }
        }

        info!(cursor, "Tailing consumer stopped");
        Ok(())
    }

    /// Load the starting cursor, retrying until it succeeds. `None` means
    /// shutdown fired first.
    async fn load_cursor(&self, shutdown: &CancellationToken) -> Option<Sequence> {
        loop {
            match self.repository.last_sequence(self.publisher_id).await {
                Ok(sequence) => return Some(sequence),
                Err(e) => {
                    warn!(error = %e, "Failed to load cursor");
                    if !self.retry.wait(shutdown).await {
                        return None;
                    }
                }
            }
        }
    }

    /// Persist `cursor`, retrying until it succeeds. `false` means shutdown
    /// fired first.
    async fn save_cursor(&self, cursor: Sequence, shutdown: &CancellationToken) -> bool {
        loop {
            match self
                .repository
                .save_last_sequence(self.publisher_id, cursor)
                .await
            {
                Ok(()) => return true,
                Err(e) => {
                    warn!(cursor, error = %e, "Failed to persist cursor");
                    if !self.retry.wait(shutdown).await {
                        return false;
                    }
                }
            }
        }
    }
}
