use crate::types::BankAccount;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub async fn find_by_id(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    id: Uuid,
) -> Result<Option<BankAccount>, sqlx::Error> {
    sqlx::query_as::<_, BankAccount>(
        r#"
        SELECT id, company_id, ledger_account_id, kind, is_active
        FROM bank_accounts
        WHERE id = $1 AND company_id = $2
        "#,
    )
    .bind(id)
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await
}
