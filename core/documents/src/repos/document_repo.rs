use crate::types::{DocumentHeader, DocumentKind, DocumentStatus};
use chrono::NaiveDate;
use money_rs::Money;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub struct NewDocument {
    pub id: Uuid,
    pub company_id: Uuid,
    pub kind: DocumentKind,
    pub number: String,
    pub date: NaiveDate,
    pub total: Money,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub linked_receipt_id: Option<Uuid>,
    pub bank_account_id: Option<Uuid>,
    pub clearing_account_id: Option<Uuid>,
    pub tax_account_id: Option<Uuid>,
}

pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    doc: NewDocument,
) -> Result<DocumentHeader, sqlx::Error> {
    sqlx::query_as::<_, DocumentHeader>(
        r#"
        INSERT INTO documents
            (id, company_id, kind, number, status, date, total, amount_settled,
             journal_entry_id, last_adjustment_journal_entry_id, void_journal_entry_id,
             location_id, currency, linked_receipt_id, bank_account_id,
             clearing_account_id, tax_account_id, created_at, updated_at)
        VALUES
            ($1, $2, $3, $4, 'DRAFT', $5, $6, 0,
             NULL, NULL, NULL,
             $7, $8, $9, $10,
             $11, $12, NOW(), NOW())
        RETURNING id, company_id, kind, number, status, date, total, amount_settled,
                  journal_entry_id, last_adjustment_journal_entry_id, void_journal_entry_id,
                  location_id, currency, linked_receipt_id, bank_account_id,
                  clearing_account_id, tax_account_id, created_at, updated_at
        "#,
    )
    .bind(doc.id)
    .bind(doc.company_id)
    .bind(doc.kind)
    .bind(doc.number)
    .bind(doc.date)
    .bind(doc.total.as_decimal())
    .bind(doc.location_id)
    .bind(doc.currency)
    .bind(doc.linked_receipt_id)
    .bind(doc.bank_account_id)
    .bind(doc.clearing_account_id)
    .bind(doc.tax_account_id)
    .fetch_one(&mut **tx)
    .await
}

/// Row-lock a document for a mutating operation (approve/post/adjust/
/// void/settle all serialize through this). The caller's transaction must
/// already be open.
pub async fn lock_by_id(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    document_id: Uuid,
) -> Result<Option<DocumentHeader>, sqlx::Error> {
    sqlx::query_as::<_, DocumentHeader>(
        r#"
        SELECT id, company_id, kind, number, status, date, total, amount_settled,
               journal_entry_id, last_adjustment_journal_entry_id, void_journal_entry_id,
               location_id, currency, linked_receipt_id, bank_account_id,
               clearing_account_id, tax_account_id, created_at, updated_at
        FROM documents
        WHERE id = $1 AND company_id = $2
        FOR UPDATE
        "#,
    )
    .bind(document_id)
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn find_by_id(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    document_id: Uuid,
) -> Result<Option<DocumentHeader>, sqlx::Error> {
    lock_by_id(tx, company_id, document_id).await
}

#[allow(clippy::too_many_arguments)]
pub async fn mark_posted(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    status: DocumentStatus,
    journal_entry_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE documents
        SET status = $2, journal_entry_id = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(document_id)
    .bind(status)
    .bind(journal_entry_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn set_status(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    status: DocumentStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE documents SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(document_id)
        .bind(status)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn set_amount_settled(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    amount_settled: Money,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE documents SET amount_settled = $2, updated_at = NOW() WHERE id = $1")
        .bind(document_id)
        .bind(amount_settled.as_decimal())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn set_last_adjustment(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    journal_entry_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE documents SET last_adjustment_journal_entry_id = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(document_id)
    .bind(journal_entry_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn set_total(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    total: Money,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE documents SET total = $2, updated_at = NOW() WHERE id = $1")
        .bind(document_id)
        .bind(total.as_decimal())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn mark_void(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
    void_journal_entry_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE documents
        SET status = 'VOID', void_journal_entry_id = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(document_id)
    .bind(void_journal_entry_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn delete(tx: &mut Transaction<'_, Postgres>, document_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM document_lines WHERE document_id = $1")
        .bind(document_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(document_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
