use crate::types::Account;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub async fn find_by_id(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    account_id: Uuid,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, company_id, code, name, account_type, normal_balance,
               report_group, cashflow_activity, is_active
        FROM accounts
        WHERE id = $1 AND company_id = $2
        "#,
    )
    .bind(account_id)
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await
}

pub async fn find_by_code(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    code: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, company_id, code, name, account_type, normal_balance,
               report_group, cashflow_activity, is_active
        FROM accounts
        WHERE company_id = $1 AND code = $2
        "#,
    )
    .bind(company_id)
    .bind(code)
    .fetch_optional(&mut **tx)
    .await
}

/// Auto-provision a GRNI/PPV-style account the first time it is needed,
/// inheriting the report group and cashflow activity conventionally
/// assigned to its account type. Returns the existing account if `code`
/// already exists for this company (provisioning is idempotent).
pub async fn provision_if_missing(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    code: &str,
    name: &str,
    account_type: crate::types::AccountType,
) -> Result<Account, sqlx::Error> {
    if let Some(existing) = find_by_code(tx, company_id, code).await? {
        return Ok(existing);
    }

    let normal_balance = account_type.conventional_normal_balance();
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO accounts (id, company_id, code, name, account_type, normal_balance, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, TRUE)
        ON CONFLICT (company_id, code) DO NOTHING
        "#,
    )
    .bind(id)
    .bind(company_id)
    .bind(code)
    .bind(name)
    .bind(account_type)
    .bind(normal_balance)
    .execute(&mut **tx)
    .await?;

    find_by_code(tx, company_id, code)
        .await?
        .ok_or_else(|| sqlx::Error::RowNotFound)
}
