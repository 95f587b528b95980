use sqlx::PgPool;
use uuid::Uuid;

/// Connects to the database named by `DATABASE_URL`. Tests in this suite
/// are `#[serial]` and assume a schema with `accounts`, `journal_entries`,
/// `journal_lines`, `period_closes`, and `event_outbox` already migrated.
pub async fn get_test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set to run gl-rs integration tests");
    PgPool::connect(&url)
        .await
        .expect("failed to connect to test database")
}

pub async fn setup_test_company(pool: &PgPool) -> Uuid {
    Uuid::new_v4()
}

pub async fn setup_active_account(
    pool: &PgPool,
    company_id: Uuid,
    code: &str,
    account_type: gl_rs::AccountType,
) -> Uuid {
    let id = Uuid::new_v4();
    let normal_balance = account_type.conventional_normal_balance();
    sqlx::query(
        r#"
        INSERT INTO accounts (id, company_id, code, name, account_type, normal_balance, is_active)
        VALUES ($1, $2, $3, $3, $4, $5, TRUE)
        "#,
    )
    .bind(id)
    .bind(company_id)
    .bind(code)
    .bind(account_type)
    .bind(normal_balance)
    .execute(pool)
    .await
    .expect("failed to insert test account");
    id
}

pub async fn cleanup_company(pool: &PgPool, company_id: Uuid) {
    let _ = sqlx::query("DELETE FROM journal_lines WHERE company_id = $1")
        .bind(company_id)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM journal_entries WHERE company_id = $1")
        .bind(company_id)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM period_closes WHERE company_id = $1")
        .bind(company_id)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM accounts WHERE company_id = $1")
        .bind(company_id)
        .execute(pool)
        .await;
}
