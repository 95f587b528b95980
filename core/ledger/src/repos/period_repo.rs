use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PeriodClose {
    pub company_id: Uuid,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub journal_entry_id: Uuid,
    pub closed_at: DateTime<Utc>,
}

/// The most recent close on record for this company, if any. Since closes
/// are never reopened, the single latest `to_date` is the only boundary
/// that matters for new postings.
pub async fn latest_close(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
) -> Result<Option<PeriodClose>, sqlx::Error> {
    sqlx::query_as::<_, PeriodClose>(
        r#"
        SELECT company_id, from_date, to_date, journal_entry_id, closed_at
        FROM period_closes
        WHERE company_id = $1
        ORDER BY to_date DESC
        LIMIT 1
        "#,
    )
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Whether `[from, to]` overlaps any previously closed window, used to
/// refuse re-closing the same (or an overlapping) range.
pub async fn overlaps_existing_close(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM period_closes
            WHERE company_id = $1 AND from_date <= $3 AND to_date >= $2
        )
        "#,
    )
    .bind(company_id)
    .bind(from)
    .bind(to)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.0)
}

pub async fn insert_close(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    journal_entry_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO period_closes (company_id, from_date, to_date, journal_entry_id, closed_at)
        VALUES ($1, $2, $3, $4, NOW())
        "#,
    )
    .bind(company_id)
    .bind(from)
    .bind(to)
    .bind(journal_entry_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Per-account net (debit − credit) across all lines dated within
/// `[from, to]`, joined to account type/code so the closing entry can be
/// built without a generic balance read-model (which is out of scope; this
/// is the one place the posting core scans `journal_lines` directly, and
/// only at close time).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountNet {
    pub account_id: Uuid,
    pub account_type: crate::types::AccountType,
    pub net_debit_minus_credit: rust_decimal::Decimal,
}

pub async fn income_and_expense_nets(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<AccountNet>, sqlx::Error> {
    sqlx::query_as::<_, AccountNet>(
        r#"
        SELECT a.id AS account_id,
               a.account_type,
               COALESCE(SUM(jl.debit - jl.credit), 0) AS net_debit_minus_credit
        FROM accounts a
        JOIN journal_lines jl ON jl.account_id = a.id
        JOIN journal_entries je ON je.id = jl.journal_entry_id
        WHERE a.company_id = $1
          AND a.account_type IN ('INCOME', 'EXPENSE')
          AND je.date BETWEEN $2 AND $3
          AND je.voided_at IS NULL
        GROUP BY a.id, a.account_type
        "#,
    )
    .bind(company_id)
    .bind(from)
    .bind(to)
    .fetch_all(&mut **tx)
    .await
}
