use crate::types::Company;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

pub async fn find_by_id(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        r#"
        SELECT id, base_currency, default_location_id, time_zone,
               default_ap_account_id, default_ar_account_id,
               default_inventory_asset_account_id, default_grni_account_id,
               default_ppv_account_id, default_sales_income_account_id,
               default_vendor_prepayment_account_id
        FROM companies
        WHERE id = $1
        "#,
    )
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Cache a just-provisioned GRNI account id on the company row so later
/// purchase-bill postings don't re-provision it (spec §4.4.3).
pub async fn set_grni_account(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    account_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE companies SET default_grni_account_id = $2 WHERE id = $1")
        .bind(company_id)
        .bind(account_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn set_ppv_account(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    account_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE companies SET default_ppv_account_id = $2 WHERE id = $1")
        .bind(company_id)
        .bind(account_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
