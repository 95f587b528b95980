//! Per-company sequence allocation for human-readable document numbers.
//!
//! Counters are keyed by `(company_id, kind)`. Allocation takes a row lock
//! on the counter row for the duration of the caller's transaction, so two
//! concurrent allocations for the same company and kind serialize against
//! each other and never hand out the same number twice. Numbers are
//! monotone but gap-tolerant: a rolled-back transaction leaves a gap rather
//! than reusing the number, which is acceptable for audit purposes.

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use tenant_context::CompanyId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NumberingError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Document kinds that draw from their own per-company counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Invoice,
    PurchaseBill,
    VendorCredit,
    CustomerAdvance,
    VendorAdvance,
    PurchaseReceipt,
    Payment,
}

impl DocumentKind {
    /// The prefix baked into the allocated number, e.g. `"INV-000123"`.
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "INV",
            DocumentKind::PurchaseBill => "PBILL",
            DocumentKind::VendorCredit => "VC",
            DocumentKind::CustomerAdvance => "CADV",
            DocumentKind::VendorAdvance => "VADV",
            DocumentKind::PurchaseReceipt => "GRN",
            DocumentKind::Payment => "PMT",
        }
    }

    fn counter_key(self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::PurchaseBill => "purchase_bill",
            DocumentKind::VendorCredit => "vendor_credit",
            DocumentKind::CustomerAdvance => "customer_advance",
            DocumentKind::VendorAdvance => "vendor_advance",
            DocumentKind::PurchaseReceipt => "purchase_receipt",
            DocumentKind::Payment => "payment",
        }
    }
}

/// Allocate the next number for `kind` within `company_id`, inside `tx`.
/// Locks the counter row (creating it at 0 if absent), increments it, and
/// returns the formatted number. The caller's transaction must commit for
/// the allocation to stick — a rollback leaves the counter at its prior
/// value, which is fine since gaps are tolerated.
pub async fn next(
    tx: &mut Transaction<'_, Postgres>,
    company_id: CompanyId,
    kind: DocumentKind,
) -> Result<String, NumberingError> {
    let row: (i64,) = sqlx::query_as(
        r#"
        INSERT INTO sequence_counters (company_id, counter_key, value)
        VALUES ($1, $2, 1)
        ON CONFLICT (company_id, counter_key)
        DO UPDATE SET value = sequence_counters.value + 1
        RETURNING value
        "#,
    )
    .bind(company_id.0)
    .bind(kind.counter_key())
    .fetch_one(&mut **tx)
    .await?;

    Ok(format(kind.prefix(), row.0))
}

fn format(prefix: &str, value: i64) -> String {
    format!("{prefix}-{value:06}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_is_zero_padded_to_at_least_six_digits() {
        assert_eq!(format("INV", 7), "INV-000007");
        assert_eq!(format("INV", 123456), "INV-123456");
        assert_eq!(format("INV", 1234567), "INV-1234567");
    }

    #[test]
    fn each_document_kind_has_a_distinct_prefix() {
        let prefixes: Vec<&str> = [
            DocumentKind::Invoice,
            DocumentKind::PurchaseBill,
            DocumentKind::VendorCredit,
            DocumentKind::CustomerAdvance,
            DocumentKind::VendorAdvance,
            DocumentKind::PurchaseReceipt,
            DocumentKind::Payment,
        ]
        .iter()
        .map(|k| k.prefix())
        .collect();

        let mut deduped = prefixes.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(prefixes.len(), deduped.len());
    }
}
