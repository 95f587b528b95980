use crate::types::{Direction, StockMoveKind, StockMoveRow};
use chrono::NaiveDate;
use money_rs::Money;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// All moves on file for `(location_id, item_id)`, oldest first. Includes
/// value-only adjustments, which share this table (quantity zero).
pub async fn fetch_ordered(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    location_id: Uuid,
    item_id: Uuid,
) -> Result<Vec<StockMoveRow>, sqlx::Error> {
    sqlx::query_as::<_, StockMoveRow>(
        r#"
        SELECT id, company_id, location_id, item_id, date, move_type, direction,
               quantity, unit_cost_applied, total_cost_applied, total_cost_override,
               reference_type, reference_id, correlation_id, journal_entry_id, created_at
        FROM stock_moves
        WHERE company_id = $1 AND location_id = $2 AND item_id = $3
        ORDER BY date, created_at
        "#,
    )
    .bind(company_id)
    .bind(location_id)
    .bind(item_id)
    .fetch_all(&mut **tx)
    .await
}

pub struct NewStockMove {
    pub id: Uuid,
    pub company_id: Uuid,
    pub location_id: Uuid,
    pub item_id: Uuid,
    pub date: NaiveDate,
    pub move_type: StockMoveKind,
    pub direction: Direction,
    pub quantity: rust_decimal::Decimal,
    pub unit_cost_applied: rust_decimal::Decimal,
    pub total_cost_applied: Money,
    pub total_cost_override: Option<Money>,
    pub reference_type: String,
    pub reference_id: String,
    pub correlation_id: Uuid,
    pub journal_entry_id: Option<Uuid>,
}

pub async fn insert(tx: &mut Transaction<'_, Postgres>, mv: NewStockMove) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO stock_moves
            (id, company_id, location_id, item_id, date, move_type, direction,
             quantity, unit_cost_applied, total_cost_applied, total_cost_override,
             reference_type, reference_id, correlation_id, journal_entry_id, created_at)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,NOW())
        "#,
    )
    .bind(mv.id)
    .bind(mv.company_id)
    .bind(mv.location_id)
    .bind(mv.item_id)
    .bind(mv.date)
    .bind(mv.move_type)
    .bind(mv.direction)
    .bind(mv.quantity)
    .bind(mv.unit_cost_applied)
    .bind(mv.total_cost_applied.as_decimal())
    .bind(mv.total_cost_override.map(|m| m.as_decimal()))
    .bind(mv.reference_type)
    .bind(mv.reference_id)
    .bind(mv.correlation_id)
    .bind(mv.journal_entry_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Revalue an existing OUT/adjustment move's applied cost after a
/// backdated replay shifted the WAC it was computed against.
pub async fn update_total_cost_applied(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    total_cost_applied: Money,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE stock_moves SET total_cost_applied = $2 WHERE id = $1")
        .bind(id)
        .bind(total_cost_applied.as_decimal())
        .execute(&mut **tx)
        .await?;

    Ok(())
}
