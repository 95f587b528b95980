use event_bus::OutboxEvent;
use sqlx::{Postgres, Transaction};

/// Insert an outbox event row in the same transaction as the balance/move
/// write it describes. See `gl-rs`'s `repos::outbox_repo` for the sibling
/// implementation this mirrors.
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    company_id: uuid::Uuid,
    event: &OutboxEvent,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO event_outbox (event_id, company_id, event_type, aggregate_type, aggregate_id, payload, created_at, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, NOW(), NULL)
        ON CONFLICT (event_id) DO NOTHING
        "#,
    )
    .bind(event.event_id)
    .bind(company_id)
    .bind(&event.event_type)
    .bind(&event.aggregate_type)
    .bind(&event.aggregate_id)
    .bind(&event.payload)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
