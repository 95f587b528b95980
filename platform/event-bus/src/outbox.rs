//! Transactional outbox row shape.
//!
//! Each module persists its own outbox table (see `ledger`'s
//! `repos::outbox_repo`, modeled on `gl-rs`'s `events_outbox` table);
//! `event-bus` only defines the row shape so every module's outbox repo
//! inserts the same columns.

use crate::EventEnvelope;
use serde::Serialize;
use uuid::Uuid;

/// A row to be written to an outbox table in the same transaction as the
/// domain write it describes.
#[derive(Debug, Clone)]
pub struct OutboxEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub payload: serde_json::Value,
}

impl OutboxEvent {
    pub fn from_envelope<T: Serialize>(
        envelope: &EventEnvelope<T>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_id: envelope.event_id,
            event_type: envelope.event_type.clone(),
            aggregate_type: envelope.aggregate_type.clone(),
            aggregate_id: envelope.aggregate_id.clone(),
            payload: serde_json::to_value(envelope)?,
        })
    }
}
