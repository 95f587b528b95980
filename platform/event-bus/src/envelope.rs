//! # Event envelope
//!
//! The canonical outbox event envelope shape for this workspace:
//! `eventId`, `eventType` (dotted), `schemaVersion`, `occurredAt`,
//! `companyId`, `partitionKey`, `correlationId`, `causationId?`,
//! `aggregateType`, `aggregateId`, `source`, `payload`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Standard event envelope published onto the bus and persisted in the
/// outbox. Consumers must treat `event_id` as the deduplication key —
/// delivery is at-least-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Globally unique identifier (idempotency/dedup key for consumers).
    pub event_id: Uuid,
    /// Dotted event type, e.g. "journal.entry.created".
    pub event_type: String,
    /// Schema version of the payload, e.g. "v1".
    pub schema_version: String,
    /// UTC timestamp when the event was generated.
    pub occurred_at: DateTime<Utc>,
    /// Tenant the event belongs to.
    pub company_id: Uuid,
    /// Always `String(company_id)` — lets consumers shard by tenant.
    pub partition_key: String,
    /// Links all events produced within one logical workflow/request.
    pub correlation_id: Uuid,
    /// Points at the event or command that directly caused this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<Uuid>,
    /// The kind of aggregate this event is about, e.g. "journal_entry".
    pub aggregate_type: String,
    /// The id of the aggregate, stringified (UUIDs, document numbers, etc).
    pub aggregate_id: String,
    /// The module that produced the event, e.g. "ledger-core".
    pub source: String,
    /// Event-specific payload.
    pub payload: T,
}

impl<T> EventEnvelope<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        company_id: Uuid,
        event_type: impl Into<String>,
        aggregate_type: impl Into<String>,
        aggregate_id: impl Into<String>,
        source: impl Into<String>,
        correlation_id: Uuid,
        causation_id: Option<Uuid>,
        payload: T,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            schema_version: "v1".to_string(),
            occurred_at: Utc::now(),
            partition_key: company_id.to_string(),
            company_id,
            correlation_id,
            causation_id,
            aggregate_type: aggregate_type.into(),
            aggregate_id: aggregate_id.into(),
            source: source.into(),
            payload,
        }
    }
}

/// Validate the envelope fields of an arbitrary JSON value.
///
/// Used at consumer boundaries before attempting to deserialize the typed
/// payload, so a malformed envelope fails fast with a clear message rather
/// than an opaque serde error.
pub fn validate_envelope_fields(envelope: &serde_json::Value) -> Result<(), String> {
    envelope
        .get("event_id")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid event_id")?;

    envelope
        .get("occurred_at")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid occurred_at")?;

    let event_type = envelope
        .get("event_type")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid event_type")?;
    if event_type.is_empty() {
        return Err("event_type cannot be empty".to_string());
    }

    let company_id = envelope
        .get("company_id")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid company_id")?;
    if company_id.is_empty() {
        return Err("company_id cannot be empty".to_string());
    }

    let partition_key = envelope
        .get("partition_key")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid partition_key")?;
    if partition_key != company_id {
        return Err("partition_key must equal company_id".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_new_fills_partition_key_from_company_id() {
        let company_id = Uuid::new_v4();
        let envelope = EventEnvelope::new(
            company_id,
            "journal.entry.created",
            "journal_entry",
            "je_123",
            "ledger-core",
            Uuid::new_v4(),
            None,
            json!({"total": "220.00"}),
        );

        assert_eq!(envelope.partition_key, company_id.to_string());
        assert_eq!(envelope.schema_version, "v1");
        assert!(envelope.causation_id.is_none());
    }

    #[test]
    fn validate_envelope_fields_rejects_mismatched_partition_key() {
        let envelope = json!({
            "event_id": "550e8400-e29b-41d4-a716-446655440000",
            "occurred_at": "2026-01-01T00:00:00Z",
            "event_type": "journal.entry.created",
            "company_id": "tenant-1",
            "partition_key": "tenant-2",
        });

        assert!(validate_envelope_fields(&envelope).is_err());
    }

    #[test]
    fn validate_envelope_fields_accepts_well_formed_envelope() {
        let envelope = json!({
            "event_id": "550e8400-e29b-41d4-a716-446655440000",
            "occurred_at": "2026-01-01T00:00:00Z",
            "event_type": "journal.entry.created",
            "company_id": "tenant-1",
            "partition_key": "tenant-1",
        });

        assert!(validate_envelope_fields(&envelope).is_ok());
    }
}
