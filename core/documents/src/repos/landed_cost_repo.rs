use money_rs::Money;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub struct NewAllocation {
    pub company_id: Uuid,
    pub purchase_bill_id: Uuid,
    pub purchase_receipt_line_id: Uuid,
    pub amount: Money,
}

pub async fn insert_all(
    tx: &mut Transaction<'_, Postgres>,
    allocations: &[NewAllocation],
) -> Result<(), sqlx::Error> {
    for allocation in allocations {
        sqlx::query(
            r#"
            INSERT INTO purchase_bill_landed_cost_allocations
                (company_id, purchase_bill_id, purchase_receipt_line_id, amount)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(allocation.company_id)
        .bind(allocation.purchase_bill_id)
        .bind(allocation.purchase_receipt_line_id)
        .bind(allocation.amount.as_decimal())
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
