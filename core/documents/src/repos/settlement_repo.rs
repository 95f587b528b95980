use crate::types::{Settlement, SettlementKind};
use chrono::NaiveDate;
use money_rs::Money;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub struct NewSettlement {
    pub id: Uuid,
    pub company_id: Uuid,
    pub document_id: Uuid,
    pub source_id: Option<Uuid>,
    pub kind: SettlementKind,
    pub date: NaiveDate,
    pub amount: Money,
    pub journal_entry_id: Option<Uuid>,
}

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    settlement: NewSettlement,
) -> Result<Settlement, sqlx::Error> {
    sqlx::query_as::<_, Settlement>(
        r#"
        INSERT INTO settlements
            (id, company_id, document_id, source_id, kind, date, amount, journal_entry_id, reversed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NULL)
        RETURNING id, company_id, document_id, source_id, kind, date, amount, journal_entry_id, reversed_at
        "#,
    )
    .bind(settlement.id)
    .bind(settlement.company_id)
    .bind(settlement.document_id)
    .bind(settlement.source_id)
    .bind(settlement.kind)
    .bind(settlement.date)
    .bind(settlement.amount.as_decimal())
    .bind(settlement.journal_entry_id)
    .fetch_one(&mut **tx)
    .await
}

/// Σ non-reversed settlement amounts against `document_id` — the
/// `Σ(non-reversed payments) + Σ(credit applications) + Σ(advance
/// applications)` term in spec §4.4.4 and the §8 testable property.
pub async fn total_settled(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    document_id: Uuid,
) -> Result<Money, sqlx::Error> {
    let row: (rust_decimal::Decimal,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM settlements
        WHERE company_id = $1 AND document_id = $2 AND reversed_at IS NULL
        "#,
    )
    .bind(company_id)
    .bind(document_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(Money::from_decimal(row.0))
}

/// Σ non-reversed amounts already drawn *from* a credit note or advance
/// (`source_id`), i.e. how much of it has already been applied elsewhere.
pub async fn total_applied_from_source(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    source_id: Uuid,
) -> Result<Money, sqlx::Error> {
    let row: (rust_decimal::Decimal,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount), 0)
        FROM settlements
        WHERE company_id = $1 AND source_id = $2 AND reversed_at IS NULL
        "#,
    )
    .bind(company_id)
    .bind(source_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(Money::from_decimal(row.0))
}
