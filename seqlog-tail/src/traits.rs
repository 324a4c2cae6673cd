//! Collaborators the tailing consumer depends on.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use seqlog_core::{Event, Sequence};

use crate::error::Result;

/// Identity under which a consumer's cursor is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublisherId(pub u32);

impl fmt::Display for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "publisher-{}", self.0)
    }
}

/// Durable storage for events and consumer cursors.
///
/// Implementations must serialize cursor writes for the same identity.
#[async_trait]
pub trait CursorRepository<P>: Send + Sync {
    /// Last sequence persisted for `id`, or 0 if none was ever saved.
    async fn last_sequence(&self, id: PublisherId) -> Result<Sequence>;

    /// Persist the cursor for `id`.
    async fn save_last_sequence(&self, id: PublisherId, sequence: Sequence) -> Result<()>;

    /// Up to `limit` stored events starting at `from`, in sequence order.
    async fn events_from_sequence(&self, from: Sequence, limit: u64) -> Result<Vec<Event<P>>>;
}

/// Destination the consumer forwards batches to.
#[async_trait]
pub trait EventSink<P>: Send + Sync {
    /// Deliver a batch. May be called with an empty batch.
    async fn publish(&self, events: &[Event<P>]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publisher_id_display() {
        assert_eq!(PublisherId(7).to_string(), "publisher-7");
    }

    #[test]
    fn publisher_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&PublisherId(3)).unwrap(), "3");
    }
}
