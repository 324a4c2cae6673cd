//! Tailing consumer for a seqlog event log.
//!
//! A [`TailingConsumer`] continuously moves events from a running
//! [`EventLog`](seqlog_core::EventLog) into an [`EventSink`], falling back to a
//! [`CursorRepository`] when the range it needs has already left memory, and
//! persisting its cursor after each delivered batch.
//!
//! Delivery is at-least-once: a batch that reached the sink may be delivered
//! again after a restart if the cursor write that followed it failed.
//!
//! # Cursor and baseline
//!
//! The consumer's cursor and the log's baseline are tracked separately. The
//! log rejects fetches at or below its baseline (the consumer then reads from
//! the repository), and treats a fetch beyond `current + 1` as a defect. A
//! host must therefore never let a persisted cursor run ahead of what the log
//! has published, e.g. by starting the log with the head of the same durable
//! store the repository reads from.

pub mod config;
pub mod consumer;
pub mod error;
pub mod memory;
pub mod retry;
pub mod traits;

// Re-exports
pub use config::TailConfig;
pub use consumer::TailingConsumer;
pub use error::{Result, TailError};
pub use memory::{InMemoryRepository, RecordingSink};
pub use retry::RetryPolicy;
pub use traits::{CursorRepository, EventSink, PublisherId};
