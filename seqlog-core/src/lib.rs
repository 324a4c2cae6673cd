//! Bounded, append-only event log with a one-step long-poll fetch.
//!
//! The log keeps the most recent `event_buffer_size` events in a ring buffer
//! owned by a single engine task. Producers and readers never touch that
//! buffer directly: they talk to the engine through two bounded mailboxes
//! via a cloneable [`EventLog`] handle.
//!
//! # Key Types
//!
//! - [`LogEngine`] - The task that owns the ring buffer; run it exactly once
//! - [`EventLog`] - Handle for publishing events and fetching ranges
//! - [`FetchRequest`] / [`FetchResponse`] - One read and its single reply
//! - [`LogConfig`] - Ring-buffer and mailbox capacities
//!
//! # Baseline
//!
//! The engine is created with a baseline sequence. Fetches at or below the
//! baseline always report `existed == false`, and the baseline never moves
//! while the engine runs. It is a startup parameter (usually the head of the
//! durable store the log was resumed from), not the cursor of any reader.
//! Readers that fall below it are expected to read from durable storage.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
mod ring;

// Re-exports
pub use config::LogConfig;
pub use engine::{EventLog, LogEngine};
pub use error::{ConfigError, LogError, Result};
pub use event::{Event, FetchRequest, FetchResponse, Sequence};
