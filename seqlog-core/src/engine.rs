//! The event log engine and its handle.
//!
//! ```text
//!  producers ──publish──▶ [publish mailbox] ─┐
//!                                            ├──▶ LogEngine::run ──▶ RingBuffer
//!  readers ────fetch────▶ [fetch mailbox] ───┘          │
//!     ▲                                                 │
//!     └──────────────── oneshot reply ◀─────────────────┘
//! ```
//!
//! The engine is the only reader and writer of the ring buffer and the
//! sequence counters, so publishes and fetches are linearized by the order in
//! which the engine takes them off its mailboxes.
//!
//! A fetch for exactly `current + 1` is parked until the next message
//! arrives. Whatever that message is (a publish, another fetch that can be
//! answered, or shutdown), every parked request is answered right after it,
//! newest first. Parked readers therefore see at most one new event per
//! round trip and are expected to re-issue their fetch.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::LogConfig;
use crate::error::{ConfigError, LogError, Result};
use crate::event::{Event, FetchRequest, FetchResponse, Sequence};
use crate::ring::RingBuffer;

/// Cloneable handle for publishing to and fetching from a running engine.
pub struct EventLog<P> {
    publish_tx: mpsc::Sender<Event<P>>,
    fetch_tx: mpsc::Sender<FetchRequest<P>>,
}

impl<P> Clone for EventLog<P> {
    fn clone(&self) -> Self {
        Self {
            publish_tx: self.publish_tx.clone(),
            fetch_tx: self.fetch_tx.clone(),
        }
    }
}

impl<P> EventLog<P>
where
    P: Send + 'static,
{
    /// Queue an event for the engine.
    ///
    /// Waits while the publish mailbox is full. Sequence numbers are not
    /// checked here; producers must publish `current + 1, current + 2, ...`.
    pub async fn publish(&self, event: Event<P>) -> Result<()> {
        self.publish_tx
            .send(event)
            .await
            .map_err(|_| LogError::Closed)
    }

    /// Queue a fetch request. The reply arrives on the request's own channel.
    pub async fn fetch(&self, request: FetchRequest<P>) -> Result<()> {
        self.fetch_tx
            .send(request)
            .await
            .map_err(|_| LogError::Closed)
    }

    /// Fetch up to `limit` events starting at `from_sequence` and wait for
    /// the reply.
    ///
    /// Results are appended to `buffer`. If `from_sequence` is the next
    /// sequence to be published this waits for the engine's next message.
    pub async fn fetch_range(
        &self,
        from_sequence: Sequence,
        limit: u64,
        buffer: Vec<Event<P>>,
    ) -> Result<FetchResponse<P>> {
        let (tx, rx) = oneshot::channel();
        self.fetch(FetchRequest::new(from_sequence, limit, tx).with_buffer(buffer))
            .await?;
        rx.await.map_err(|_| LogError::Closed)
    }
}

/// What woke the engine up.
enum Signal<P> {
    Shutdown,
    Disconnected,
    Publish(Event<P>),
    Fetch(FetchRequest<P>),
}

/// Single-owner task holding the ring buffer and sequence counters.
pub struct LogEngine<P> {
    ring: RingBuffer<P>,
    baseline: Sequence,
    current: Sequence,
    publish_rx: mpsc::Receiver<Event<P>>,
    fetch_rx: mpsc::Receiver<FetchRequest<P>>,
    publish_closed: bool,
    fetch_closed: bool,
}

impl<P> LogEngine<P>
where
    P: Clone + Send + 'static,
{
    /// Create an engine and the handle used to reach it.
    ///
    /// `baseline` is the highest sequence the caller already holds durably.
    /// Publishing is expected to continue at `baseline + 1`.
    pub fn new(
        baseline: Sequence,
        config: &LogConfig,
    ) -> std::result::Result<(Self, EventLog<P>), ConfigError> {
        config.validate()?;

        let (publish_tx, publish_rx) = mpsc::channel(config.publish_queue_size);
        let (fetch_tx, fetch_rx) = mpsc::channel(config.fetch_queue_size);

        let engine = Self {
            ring: RingBuffer::with_capacity(config.event_buffer_size),
            baseline,
            current: baseline,
            publish_rx,
            fetch_rx,
            publish_closed: false,
            fetch_closed: false,
        };
        let handle = EventLog {
            publish_tx,
            fetch_tx,
        };
        Ok((engine, handle))
    }

    /// Run the engine on a new tokio task.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run(shutdown))
    }

    /// Serve publishes and fetches until `shutdown` fires or every handle is
    /// dropped.
    ///
    /// Returns [`LogError::FetchAhead`] if a fetch asks for a sequence beyond
    /// `current + 1`; the engine stops immediately and any parked requests
    /// see their reply channel closed.
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        info!(
            capacity = self.ring.capacity(),
            baseline = self.baseline,
            "event log started"
        );

        let mut parked: Vec<FetchRequest<P>> = Vec::new();

        loop {
            let stop = match self.next_signal(&shutdown).await {
                Signal::Shutdown => {
                    info!("event log received shutdown signal");
                    true
                }
                Signal::Disconnected => {
                    info!("all event log handles dropped");
                    true
                }
                Signal::Publish(event) => {
                    self.apply(event);
                    false
                }
                Signal::Fetch(request) => {
                    let next = self.current.saturating_add(1);
                    if request.from_sequence > next {
                        error!(
                            requested = request.from_sequence,
                            next, "fetch is ahead of the log, stopping engine"
                        );
                        return Err(LogError::FetchAhead {
                            requested: request.from_sequence,
                            next,
                        });
                    }
                    if request.from_sequence == next {
                        trace!(from = next, parked = parked.len() + 1, "waiting for next event");
                        parked.push(request);
                        continue;
                    }
                    self.respond(request);
                    false
                }
            };

            // Unwind newest first.
            while let Some(request) = parked.pop() {
                self.respond(request);
            }

            if stop {
                info!(current = self.current, "event log stopped");
                return Ok(());
            }
        }
    }

    /// Wait for the next message. A closed mailbox stops being polled; the
    /// other one keeps draining until it closes too.
    async fn next_signal(&mut self, shutdown: &CancellationToken) -> Signal<P> {
        loop {
            if self.publish_closed && self.fetch_closed {
                return Signal::Disconnected;
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Signal::Shutdown,
                event = self.publish_rx.recv(), if !self.publish_closed => match event {
                    Some(event) => return Signal::Publish(event),
                    None => {
                        debug!("publish mailbox closed");
                        self.publish_closed = true;
                    }
                },
                request = self.fetch_rx.recv(), if !self.fetch_closed => match request {
                    Some(request) => return Signal::Fetch(request),
                    None => {
                        debug!("fetch mailbox closed");
                        self.fetch_closed = true;
                    }
                },
            }
        }
    }

    fn apply(&mut self, event: Event<P>) {
        let expected = self.current.saturating_add(1);
        if event.sequence != expected {
            warn!(
                expected,
                sequence = event.sequence,
                "published sequence is not contiguous"
            );
        }
        trace!(sequence = event.sequence, "event published");
        self.current = event.sequence;
        self.ring.insert(event);
    }

    fn respond(&self, request: FetchRequest<P>) {
        let FetchRequest {
            from_sequence,
            limit,
            buffer,
            respond_to,
        } = request;

        let response = self.compute(from_sequence, limit, buffer);
        trace!(
            from = from_sequence,
            existed = response.existed,
            count = response.result.len(),
            "fetch answered"
        );
        if respond_to.send(response).is_err() {
            trace!(from = from_sequence, "fetch requester went away");
        }
    }

    /// Assumes `from_sequence <= current + 1`.
    fn compute(
        &self,
        from_sequence: Sequence,
        limit: u64,
        mut buffer: Vec<Event<P>>,
    ) -> FetchResponse<P> {
        if from_sequence <= self.baseline {
            return FetchResponse::missing(buffer);
        }

        // The slot for `from_sequence` was reused once `current` moved a full
        // capacity past it.
        let next = self.current.saturating_add(1);
        if from_sequence.saturating_add(self.ring.capacity()) < next {
            return FetchResponse::missing(buffer);
        }

        let top = next.min(from_sequence.saturating_add(limit));
        self.ring.read_into(from_sequence, top - from_sequence, &mut buffer);
        FetchResponse::found(buffer)
    }
}
