//! Events and the fetch request/response pair.

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Sequence number assigned to an event by its producer.
pub type Sequence = u64;

/// A published event: an externally assigned sequence plus an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event<P> {
    pub sequence: Sequence,
    pub payload: P,
}

impl<P> Event<P> {
    pub fn new(sequence: Sequence, payload: P) -> Self {
        Self { sequence, payload }
    }
}

/// A single pending read against the log.
///
/// The engine answers every request exactly once on `respond_to`. Events are
/// appended to `buffer`, so a caller can hand back the vector from a previous
/// response to reuse its allocation.
pub struct FetchRequest<P> {
    /// First sequence wanted.
    pub from_sequence: Sequence,
    /// Maximum number of events in the reply.
    pub limit: u64,
    /// Buffer the result is appended to.
    pub buffer: Vec<Event<P>>,
    /// Where the reply is delivered.
    pub respond_to: oneshot::Sender<FetchResponse<P>>,
}

impl<P> FetchRequest<P> {
    /// Create a request with a fresh result buffer.
    pub fn new(
        from_sequence: Sequence,
        limit: u64,
        respond_to: oneshot::Sender<FetchResponse<P>>,
    ) -> Self {
        Self {
            from_sequence,
            limit,
            buffer: Vec::new(),
            respond_to,
        }
    }

    /// Append results to `buffer` instead of a fresh vector.
    #[must_use]
    pub fn with_buffer(mut self, buffer: Vec<Event<P>>) -> Self {
        self.buffer = buffer;
        self
    }
}

/// Reply to a [`FetchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse<P> {
    /// `false` when the start of the range is below the baseline or has
    /// already been evicted from memory.
    pub existed: bool,
    /// The requested events in ascending sequence order.
    pub result: Vec<Event<P>>,
}

impl<P> FetchResponse<P> {
    pub(crate) fn found(result: Vec<Event<P>>) -> Self {
        Self {
            existed: true,
            result,
        }
    }

    /// Range not retained. The caller's buffer is returned empty so its
    /// allocation survives.
    pub(crate) fn missing(mut buffer: Vec<Event<P>>) -> Self {
        buffer.clear();
        Self {
            existed: false,
            result: buffer,
        }
    }
}
