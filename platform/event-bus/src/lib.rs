//! # EventBus abstraction
//!
//! A platform-level abstraction for event-driven messaging shared by every
//! crate in this workspace that needs to publish domain events.
//!
//! ## Why this lives in `platform/`
//!
//! The EventBus is a shared runtime capability: the ledger, inventory, and
//! document engines all publish onto it after committing a transaction, but
//! none of them should depend on NATS directly. Placing it here lets the
//! bus implementation be swapped (NATS in production, in-memory in tests)
//! without touching call sites.
//!
//! ## Implementations
//!
//! - [`NatsBus`]: production implementation backed by NATS JetStream.
//! - [`InMemoryBus`]: test/dev implementation using a broadcast channel.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{EventBus, InMemoryBus};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bus: std::sync::Arc<dyn EventBus> = std::sync::Arc::new(InMemoryBus::new());
//! bus.publish("ledger.events.journal.entry.created", b"{}".to_vec()).await?;
//! # Ok(())
//! # }
//! ```

mod envelope;
mod inmemory_bus;
mod nats_bus;
mod outbox;

pub use envelope::{validate_envelope_fields, EventEnvelope};
pub use inmemory_bus::InMemoryBus;
pub use nats_bus::NatsBus;
pub use outbox::OutboxEvent;

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;

/// A message received from the event bus.
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// The subject/topic this message was published to.
    pub subject: String,
    /// The message payload (raw bytes, typically a serialized [`EventEnvelope`]).
    pub payload: Vec<u8>,
    /// Optional headers (reserved for future use).
    pub headers: Option<std::collections::HashMap<String, String>>,
    /// Optional reply-to subject (for request-response patterns).
    pub reply_to: Option<String>,
}

impl BusMessage {
    pub fn new(subject: String, payload: Vec<u8>) -> Self {
        Self {
            subject,
            payload,
            headers: None,
            reply_to: None,
        }
    }

    pub fn with_headers(mut self, headers: std::collections::HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }
}

/// Errors that can occur when using the event bus.
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("failed to publish message: {0}")]
    PublishError(String),

    #[error("failed to subscribe to subject: {0}")]
    SubscribeError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("invalid subject pattern: {0}")]
    InvalidSubject(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

pub type BusResult<T> = Result<T, BusError>;

/// Core event bus abstraction for publish-subscribe messaging.
///
/// The posting path treats publishing as a best-effort, fire-and-forget
/// fast path performed *after* the database transaction commits; the
/// guaranteed delivery path is the outbox poller (out of scope here), which
/// reads rows written via [`OutboxRepository`] in the same transaction as
/// the domain write.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a message to a subject.
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()>;

    /// Subscribe to messages matching a subject pattern.
    ///
    /// Supports NATS-style wildcards: `*` matches a single token, `>`
    /// matches one or more trailing tokens.
    async fn subscribe(&self, subject: &str) -> BusResult<BoxStream<'static, BusMessage>>;
}

impl fmt::Debug for dyn EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus")
    }
}
