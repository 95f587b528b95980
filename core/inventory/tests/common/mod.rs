use sqlx::PgPool;
use uuid::Uuid;

/// Connects to the database named by `DATABASE_URL`. Tests in this suite
/// are `#[serial]` and assume a schema with `stock_moves`,
/// `inventory_balances`, and `event_outbox` already migrated.
pub async fn get_test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set to run inventory-rs integration tests");
    PgPool::connect(&url)
        .await
        .expect("failed to connect to test database")
}

pub async fn cleanup_company(pool: &PgPool, company_id: Uuid) {
    let _ = sqlx::query("DELETE FROM stock_moves WHERE company_id = $1")
        .bind(company_id)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM inventory_balances WHERE company_id = $1")
        .bind(company_id)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM event_outbox WHERE company_id = $1")
        .bind(company_id)
        .execute(pool)
        .await;
}
