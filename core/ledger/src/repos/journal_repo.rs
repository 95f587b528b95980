use crate::types::{JournalEntry, JournalLine};
use chrono::{DateTime, NaiveDate, Utc};
use money_rs::Money;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub struct NewEntry<'a> {
    pub id: Uuid,
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub description: &'a str,
    pub reversal_of_journal_entry_id: Option<Uuid>,
}

pub async fn insert_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry: NewEntry<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO journal_entries (id, company_id, date, description, reversal_of_journal_entry_id, created_at)
        VALUES ($1, $2, $3, $4, $5, NOW())
        "#,
    )
    .bind(entry.id)
    .bind(entry.company_id)
    .bind(entry.date)
    .bind(entry.description)
    .bind(entry.reversal_of_journal_entry_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub struct NewLine {
    pub id: Uuid,
    pub company_id: Uuid,
    pub journal_entry_id: Uuid,
    pub account_id: Uuid,
    pub debit: Money,
    pub credit: Money,
}

pub async fn bulk_insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    lines: &[NewLine],
) -> Result<(), sqlx::Error> {
    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO journal_lines (id, company_id, journal_entry_id, account_id, debit, credit)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(line.id)
        .bind(line.company_id)
        .bind(line.journal_entry_id)
        .bind(line.account_id)
        .bind(line.debit.as_decimal())
        .bind(line.credit.as_decimal())
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: Uuid,
    company_id: Uuid,
    date: NaiveDate,
    description: String,
    reversal_of_journal_entry_id: Option<Uuid>,
    voided_at: Option<DateTime<Utc>>,
    void_reason: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LineRow {
    id: Uuid,
    company_id: Uuid,
    journal_entry_id: Uuid,
    account_id: Uuid,
    debit: rust_decimal::Decimal,
    credit: rust_decimal::Decimal,
}

pub async fn fetch_entry_with_lines(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    entry_id: Uuid,
) -> Result<Option<(JournalEntry, Vec<JournalLine>)>, sqlx::Error> {
    let entry_row = sqlx::query_as::<_, EntryRow>(
        r#"
        SELECT id, company_id, date, description, reversal_of_journal_entry_id, voided_at, void_reason, created_at
        FROM journal_entries
        WHERE id = $1 AND company_id = $2
        "#,
    )
    .bind(entry_id)
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await?;

    let Some(entry_row) = entry_row else {
        return Ok(None);
    };

    let line_rows = sqlx::query_as::<_, LineRow>(
        r#"
        SELECT id, company_id, journal_entry_id, account_id, debit, credit
        FROM journal_lines
        WHERE journal_entry_id = $1
        ORDER BY id
        "#,
    )
    .bind(entry_id)
    .fetch_all(&mut **tx)
    .await?;

    let entry = JournalEntry {
        id: entry_row.id,
        company_id: entry_row.company_id,
        date: entry_row.date,
        description: entry_row.description,
        reversal_of_journal_entry_id: entry_row.reversal_of_journal_entry_id,
        voided_at: entry_row.voided_at,
        void_reason: entry_row.void_reason,
        created_at: entry_row.created_at,
    };

    let lines = line_rows
        .into_iter()
        .map(|r| JournalLine {
            id: r.id,
            company_id: r.company_id,
            journal_entry_id: r.journal_entry_id,
            account_id: r.account_id,
            debit: Money::from_decimal(r.debit),
            credit: Money::from_decimal(r.credit),
        })
        .collect();

    Ok(Some((entry, lines)))
}

/// Does any entry already reverse `entry_id`? Used to reject re-reversal.
pub async fn has_existing_reversal(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    entry_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM journal_entries
            WHERE company_id = $1 AND reversal_of_journal_entry_id = $2
        )
        "#,
    )
    .bind(company_id)
    .bind(entry_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row.0)
}

pub async fn mark_voided(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    entry_id: Uuid,
    reason: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE journal_entries
        SET voided_at = NOW(), void_reason = $3
        WHERE id = $1 AND company_id = $2
        "#,
    )
    .bind(entry_id)
    .bind(company_id)
    .bind(reason)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Net (debit − credit) per account for an entry's lines, used by the
/// net-delta adjustment calculation.
pub fn net_by_account(lines: &[JournalLine]) -> std::collections::HashMap<Uuid, Money> {
    let mut nets = std::collections::HashMap::new();
    for line in lines {
        let entry = nets.entry(line.account_id).or_insert(Money::ZERO);
        *entry = *entry + line.debit - line.credit;
    }
    nets
}
