//! Integration coverage for the WAC engine's backdated-move replay against
//! a real Postgres schema. Requires `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

mod common;

use chrono::NaiveDate;
use inventory_rs::services::wac_engine::apply_stock_move_wac;
use inventory_rs::types::{Direction, StockMoveInput, StockMoveKind};
use money_rs::{Money, Rate};
use serial_test::serial;
use tenant_context::{CompanyId, TenantContext};
use uuid::Uuid;

fn move_input(
    location_id: Uuid,
    item_id: Uuid,
    date: NaiveDate,
    move_type: StockMoveKind,
    direction: Direction,
    quantity: &str,
    unit_cost: &str,
    allow_backdated: bool,
) -> StockMoveInput {
    StockMoveInput {
        location_id,
        item_id,
        date,
        move_type,
        direction,
        quantity: Rate::parse(quantity).unwrap(),
        unit_cost_applied: Rate::parse(unit_cost).unwrap(),
        total_cost_override: None,
        reference_type: "test".to_string(),
        reference_id: Uuid::new_v4().to_string(),
        correlation_id: Uuid::new_v4(),
        journal_entry_id: None,
        allow_backdated,
        allow_negative_on_hand: false,
    }
}

#[tokio::test]
#[serial]
#[ignore]
async fn backdated_receipt_revalues_the_out_move_and_requests_a_recalc() {
    let pool = common::get_test_pool().await;
    let company_id = Uuid::new_v4();
    let ctx = TenantContext::new(CompanyId::new(company_id));
    let location_id = Uuid::new_v4();
    let item_id = Uuid::new_v4();

    let day_0 = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let day_5 = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    let day_2 = NaiveDate::from_ymd_opt(2026, 1, 3).unwrap();

    let mut tx = pool.begin().await.unwrap();
    apply_stock_move_wac(
        &mut tx,
        &ctx,
        move_input(
            location_id,
            item_id,
            day_0,
            StockMoveKind::PurchaseReceipt,
            Direction::In,
            "10",
            "5",
            false,
        ),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let issue = apply_stock_move_wac(
        &mut tx,
        &ctx,
        move_input(
            location_id,
            item_id,
            day_5,
            StockMoveKind::SaleIssue,
            Direction::Out,
            "4",
            "0",
            false,
        ),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(issue.total_cost_applied, Money::parse("20.00").unwrap());

    let mut tx = pool.begin().await.unwrap();
    let backdated = apply_stock_move_wac(
        &mut tx,
        &ctx,
        move_input(
            location_id,
            item_id,
            day_2,
            StockMoveKind::PurchaseReceipt,
            Direction::In,
            "10",
            "7",
            true,
        ),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(backdated.total_cost_applied, Money::parse("70.00").unwrap());

    let revalued_cost: rust_decimal::Decimal =
        sqlx::query_scalar("SELECT total_cost_applied FROM stock_moves WHERE id = $1")
            .bind(issue.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(revalued_cost, rust_decimal::Decimal::new(2400, 2));

    let recalc_events: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM event_outbox WHERE company_id = $1 AND event_type = 'inventory.recalc.requested'",
    )
    .bind(company_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(recalc_events, 1);

    let (qty, value, wac): (rust_decimal::Decimal, rust_decimal::Decimal, rust_decimal::Decimal) =
        sqlx::query_as(
            "SELECT quantity_on_hand, total_value, wac FROM inventory_balances WHERE company_id = $1 AND location_id = $2 AND item_id = $3",
        )
        .bind(company_id)
        .bind(location_id)
        .bind(item_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(qty, rust_decimal::Decimal::new(16, 0));
    assert_eq!(value, rust_decimal::Decimal::new(9600, 2));
    assert_eq!(wac, rust_decimal::Decimal::new(6000000, 6));

    common::cleanup_company(&pool, company_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn issuing_more_than_on_hand_is_rejected() {
    let pool = common::get_test_pool().await;
    let company_id = Uuid::new_v4();
    let ctx = TenantContext::new(CompanyId::new(company_id));
    let location_id = Uuid::new_v4();
    let item_id = Uuid::new_v4();

    let mut tx = pool.begin().await.unwrap();
    apply_stock_move_wac(
        &mut tx,
        &ctx,
        move_input(
            location_id,
            item_id,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            StockMoveKind::PurchaseReceipt,
            Direction::In,
            "5",
            "10",
            false,
        ),
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let result = apply_stock_move_wac(
        &mut tx,
        &ctx,
        move_input(
            location_id,
            item_id,
            NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            StockMoveKind::SaleIssue,
            Direction::Out,
            "6",
            "0",
            false,
        ),
    )
    .await;
    tx.rollback().await.unwrap();

    assert!(matches!(
        result,
        Err(inventory_rs::InventoryError::InsufficientStock { .. })
    ));

    common::cleanup_company(&pool, company_id).await;
}
