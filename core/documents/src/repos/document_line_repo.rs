use crate::types::{ComputedLine, DocumentLineRow};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub async fn replace_lines(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    document_id: Uuid,
    lines: &[ComputedLine],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM document_lines WHERE document_id = $1")
        .bind(document_id)
        .execute(&mut **tx)
        .await?;

    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO document_lines
                (id, company_id, document_id, item_id, account_id, quantity, unit_amount,
                 discount_amount, tax_rate, tax_amount, line_total, is_inventory_tracked)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(document_id)
        .bind(line.input.item_id)
        .bind(line.input.account_id)
        .bind(line.input.quantity.as_decimal())
        .bind(line.input.unit_amount.as_decimal())
        .bind(line.input.discount_amount.as_decimal())
        .bind(line.input.tax_rate.as_decimal())
        .bind(line.tax_amount.as_decimal())
        .bind(line.line_total.as_decimal())
        .bind(line.input.is_inventory_tracked)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

pub async fn fetch_for_document(
    tx: &mut Transaction<'_, Postgres>,
    document_id: Uuid,
) -> Result<Vec<DocumentLineRow>, sqlx::Error> {
    sqlx::query_as::<_, DocumentLineRow>(
        r#"
        SELECT id, company_id, document_id, item_id, account_id, quantity, unit_amount,
               discount_amount, tax_rate, tax_amount, line_total, is_inventory_tracked
        FROM document_lines
        WHERE document_id = $1
        ORDER BY id
        "#,
    )
    .bind(document_id)
    .fetch_all(&mut **tx)
    .await
}
