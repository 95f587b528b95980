//! Integration coverage for posting + reversal against a real Postgres
//! schema. Requires `DATABASE_URL`; run with `cargo test -- --ignored` in
//! an environment with the migrated schema, same as the rest of the
//! workspace's `#[serial]` DB-backed suites.

mod common;

use chrono::NaiveDate;
use gl_rs::services::journal_service::{post_journal_entry, PostJournalEntryInput};
use gl_rs::services::reversal_service::{create_reversal, CreateReversalInput};
use gl_rs::types::{AccountType, JournalLineInput};
use money_rs::Money;
use serial_test::serial;
use tenant_context::{CompanyId, TenantContext};
use uuid::Uuid;

#[tokio::test]
#[serial]
#[ignore]
async fn posting_an_invoice_produces_a_balanced_three_line_entry() {
    let pool = common::get_test_pool().await;
    let company_id = common::setup_test_company(&pool).await;
    let ctx = TenantContext::new(CompanyId::new(company_id));

    let ar = common::setup_active_account(&pool, company_id, "1100-AR", AccountType::Asset).await;
    let sales =
        common::setup_active_account(&pool, company_id, "4000-SALES", AccountType::Income).await;
    let tax = common::setup_active_account(
        &pool,
        company_id,
        "2100-TAX",
        AccountType::Liability,
    )
    .await;

    let mut tx = pool.begin().await.unwrap();
    let entry = post_journal_entry(
        &mut tx,
        &ctx,
        PostJournalEntryInput {
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            description: "Invoice INV-000001",
            lines: vec![
                JournalLineInput::debit(ar, Money::parse("220.00").unwrap()),
                JournalLineInput::credit(sales, Money::parse("200.00").unwrap()),
                JournalLineInput::credit(tax, Money::parse("20.00").unwrap()),
            ],
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    assert!(!entry.id.is_nil());

    common::cleanup_company(&pool, company_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn reversing_a_reversed_entry_is_rejected() {
    let pool = common::get_test_pool().await;
    let company_id = common::setup_test_company(&pool).await;
    let ctx = TenantContext::new(CompanyId::new(company_id));

    let bank = common::setup_active_account(&pool, company_id, "1000-BANK", AccountType::Asset).await;
    let expense =
        common::setup_active_account(&pool, company_id, "5000-EXP", AccountType::Expense).await;

    let mut tx = pool.begin().await.unwrap();
    let entry = post_journal_entry(
        &mut tx,
        &ctx,
        PostJournalEntryInput {
            date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            description: "Original",
            lines: vec![
                JournalLineInput::debit(expense, Money::parse("50.00").unwrap()),
                JournalLineInput::credit(bank, Money::parse("50.00").unwrap()),
            ],
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    create_reversal(
        &mut tx,
        &ctx,
        CreateReversalInput {
            original_id: entry.id,
            reversal_date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
            reason: "undo".to_string(),
            is_void: false,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let result = create_reversal(
        &mut tx,
        &ctx,
        CreateReversalInput {
            original_id: entry.id,
            reversal_date: NaiveDate::from_ymd_opt(2026, 1, 13).unwrap(),
            reason: "undo again".to_string(),
            is_void: false,
        },
    )
    .await;
    tx.rollback().await.unwrap();

    assert!(matches!(
        result,
        Err(gl_rs::LedgerError::AlreadyReversed(id)) if id == entry.id
    ));

    common::cleanup_company(&pool, company_id).await;
}

#[tokio::test]
#[serial]
#[ignore]
async fn posting_inside_a_closed_period_is_rejected() {
    let pool = common::get_test_pool().await;
    let company_id = common::setup_test_company(&pool).await;
    let ctx = TenantContext::new(CompanyId::new(company_id));

    let bank = common::setup_active_account(&pool, company_id, "1000-BANK", AccountType::Asset).await;
    let expense =
        common::setup_active_account(&pool, company_id, "5000-EXP", AccountType::Expense).await;

    sqlx::query(
        "INSERT INTO period_closes (company_id, from_date, to_date, journal_entry_id, closed_at) VALUES ($1, $2, $3, $4, NOW())",
    )
    .bind(company_id)
    .bind(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
    .bind(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap())
    .bind(Uuid::new_v4())
    .execute(&pool)
    .await
    .unwrap();

    let mut tx = pool.begin().await.unwrap();
    let result = post_journal_entry(
        &mut tx,
        &ctx,
        PostJournalEntryInput {
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            description: "late entry",
            lines: vec![
                JournalLineInput::debit(expense, Money::parse("10.00").unwrap()),
                JournalLineInput::credit(bank, Money::parse("10.00").unwrap()),
            ],
            reversal_of_journal_entry_id: None,
            skip_account_validation: false,
        },
    )
    .await;
    tx.rollback().await.unwrap();

    assert!(matches!(result, Err(gl_rs::LedgerError::PeriodClosed { .. })));

    common::cleanup_company(&pool, company_id).await;
}
