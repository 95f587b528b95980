use chrono::{DateTime, NaiveDate, Utc};
use money_rs::{Money, Rate};
use serde::{Deserialize, Serialize};
use tenant_context::{CompanyId, TenantScoped};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_kind", rename_all = "UPPERCASE")]
pub enum DocumentKind {
    Invoice,
    PurchaseBill,
    VendorCredit,
    CustomerAdvance,
    VendorAdvance,
    PurchaseReceipt,
}

impl DocumentKind {
    pub fn numbering_kind(self) -> numbering::DocumentKind {
        match self {
            DocumentKind::Invoice => numbering::DocumentKind::Invoice,
            DocumentKind::PurchaseBill => numbering::DocumentKind::PurchaseBill,
            DocumentKind::VendorCredit => numbering::DocumentKind::VendorCredit,
            DocumentKind::CustomerAdvance => numbering::DocumentKind::CustomerAdvance,
            DocumentKind::VendorAdvance => numbering::DocumentKind::VendorAdvance,
            DocumentKind::PurchaseReceipt => numbering::DocumentKind::PurchaseReceipt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "UPPERCASE")]
pub enum DocumentStatus {
    Draft,
    Approved,
    Posted,
    Partial,
    Paid,
    Void,
}

/// The shape shared by every document kind. Kind-specific behavior lives
/// in the services, not in extra fields here — `clearing_account_id` is
/// carried on the header so advances/credits can settle without a second
/// lookup (see `DESIGN.md`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentHeader {
    pub id: Uuid,
    pub company_id: Uuid,
    pub kind: DocumentKind,
    pub number: String,
    pub status: DocumentStatus,
    pub date: NaiveDate,
    pub total: rust_decimal::Decimal,
    pub amount_settled: rust_decimal::Decimal,
    pub journal_entry_id: Option<Uuid>,
    pub last_adjustment_journal_entry_id: Option<Uuid>,
    pub void_journal_entry_id: Option<Uuid>,
    pub location_id: Uuid,
    pub currency: Option<String>,
    pub linked_receipt_id: Option<Uuid>,
    pub bank_account_id: Option<Uuid>,
    pub clearing_account_id: Option<Uuid>,
    pub tax_account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentHeader {
    pub fn total_money(&self) -> Money {
        Money::from_decimal(self.total)
    }

    pub fn amount_settled_money(&self) -> Money {
        Money::from_decimal(self.amount_settled)
    }

    pub fn remaining(&self) -> Money {
        self.total_money() - self.amount_settled_money()
    }

    /// Whether content edits are allowed: draft/approved and not yet
    /// linked to a journal entry (spec §4.9 transition table).
    pub fn is_editable(&self) -> bool {
        matches!(self.status, DocumentStatus::Draft | DocumentStatus::Approved)
            && self.journal_entry_id.is_none()
    }

    pub fn is_deletable(&self) -> bool {
        self.is_editable() && self.amount_settled_money().is_zero()
    }
}

impl TenantScoped for DocumentHeader {
    fn company_id(&self) -> CompanyId {
        CompanyId(self.company_id)
    }
}

/// A line as supplied by a caller creating or editing a document; not yet
/// persisted. `account_id` is the income/expense/inventory account the
/// line posts to; `item_id` is set only for inventory-tracked lines.
#[derive(Debug, Clone)]
pub struct DocumentLineInput {
    pub item_id: Option<Uuid>,
    pub account_id: Uuid,
    pub quantity: Rate,
    pub unit_amount: Money,
    pub discount_amount: Money,
    pub tax_rate: Rate,
    pub is_inventory_tracked: bool,
}

#[derive(Debug, Clone)]
pub struct ComputedLine {
    pub input: DocumentLineInput,
    pub line_total: Money,
    pub tax_amount: Money,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentLineRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub document_id: Uuid,
    pub item_id: Option<Uuid>,
    pub account_id: Uuid,
    pub quantity: rust_decimal::Decimal,
    pub unit_amount: rust_decimal::Decimal,
    pub discount_amount: rust_decimal::Decimal,
    pub tax_rate: rust_decimal::Decimal,
    pub tax_amount: rust_decimal::Decimal,
    pub line_total: rust_decimal::Decimal,
    pub is_inventory_tracked: bool,
}

/// Per-bill allocation of landed cost across the linked receipt's lines
/// (spec §3 `PurchaseBillLandedCostAllocation`).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LandedCostAllocation {
    pub company_id: Uuid,
    pub purchase_bill_id: Uuid,
    pub purchase_receipt_line_id: Uuid,
    pub amount: rust_decimal::Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "settlement_kind", rename_all = "UPPERCASE")]
pub enum SettlementKind {
    Payment,
    CreditApplication,
    AdvanceApplication,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Settlement {
    pub id: Uuid,
    pub company_id: Uuid,
    pub document_id: Uuid,
    pub source_id: Option<Uuid>,
    pub kind: SettlementKind,
    pub date: NaiveDate,
    pub amount: rust_decimal::Decimal,
    pub journal_entry_id: Option<Uuid>,
    pub reversed_at: Option<DateTime<Utc>>,
}

impl Settlement {
    pub fn amount_money(&self) -> Money {
        Money::from_decimal(self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "bank_account_kind", rename_all = "UPPERCASE")]
pub enum BankAccountKind {
    Checking,
    Savings,
    CreditCard,
}

/// A banking account registered against a ledger account (spec §4.4.4: "the
/// bank account must be registered as a banking account"). Credit-card
/// accounts can receive customer payments but cannot source vendor
/// payments.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BankAccount {
    pub id: Uuid,
    pub company_id: Uuid,
    pub ledger_account_id: Uuid,
    pub kind: BankAccountKind,
    pub is_active: bool,
}

/// Tenant root (spec §3 `Company`). The default account references are
/// set once and read by every document-posting flow; `default_grni`/
/// `default_ppv` start `None` and are auto-provisioned (and cached here)
/// the first time a linked-receipt purchase bill needs them.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Company {
    pub id: Uuid,
    pub base_currency: String,
    pub default_location_id: Uuid,
    pub time_zone: String,
    pub default_ap_account_id: Uuid,
    pub default_ar_account_id: Uuid,
    pub default_inventory_asset_account_id: Uuid,
    pub default_grni_account_id: Option<Uuid>,
    pub default_ppv_account_id: Option<Uuid>,
    pub default_sales_income_account_id: Uuid,
    pub default_vendor_prepayment_account_id: Uuid,
}
