use crate::types::{InventoryBalance, InventoryBalanceRow};
use money_rs::{Money, Rate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Row-lock the balance for `(location_id, item_id)`, creating it at zero
/// if it does not exist yet. Every quantity move and value adjustment runs
/// under this lock for the duration of its transaction.
pub async fn lock_or_create(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    location_id: Uuid,
    item_id: Uuid,
) -> Result<InventoryBalance, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO inventory_balances (company_id, location_id, item_id, quantity_on_hand, total_value, wac)
        VALUES ($1, $2, $3, 0, 0, 0)
        ON CONFLICT (company_id, location_id, item_id) DO NOTHING
        "#,
    )
    .bind(company_id)
    .bind(location_id)
    .bind(item_id)
    .execute(&mut **tx)
    .await?;

    let row: InventoryBalanceRow = sqlx::query_as(
        r#"
        SELECT quantity_on_hand, total_value, wac
        FROM inventory_balances
        WHERE company_id = $1 AND location_id = $2 AND item_id = $3
        FOR UPDATE
        "#,
    )
    .bind(company_id)
    .bind(location_id)
    .bind(item_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(InventoryBalance {
        quantity_on_hand: Rate::from_decimal(row.quantity_on_hand),
        total_value: Money::from_decimal(row.total_value),
        wac: Rate::from_decimal(row.wac),
    })
}

pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    location_id: Uuid,
    item_id: Uuid,
    balance: InventoryBalance,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO inventory_balances (company_id, location_id, item_id, quantity_on_hand, total_value, wac)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (company_id, location_id, item_id)
        DO UPDATE SET quantity_on_hand = $4, total_value = $5, wac = $6
        "#,
    )
    .bind(company_id)
    .bind(location_id)
    .bind(item_id)
    .bind(balance.quantity_on_hand.as_decimal())
    .bind(balance.total_value.as_decimal())
    .bind(balance.wac.as_decimal())
    .execute(&mut **tx)
    .await?;

    Ok(())
}
