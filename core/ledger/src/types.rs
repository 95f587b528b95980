use chrono::{DateTime, NaiveDate, Utc};
use money_rs::Money;
use serde::{Deserialize, Serialize};
use tenant_context::{CompanyId, TenantScoped};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_type", rename_all = "UPPERCASE")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "normal_balance", rename_all = "UPPERCASE")]
pub enum NormalBalance {
    Debit,
    Credit,
}

impl AccountType {
    /// The conventional normal balance for this account type. Stored
    /// explicitly on `Account` rather than derived, but new accounts should
    /// be provisioned with this value.
    pub fn conventional_normal_balance(self) -> NormalBalance {
        match self {
            AccountType::Asset | AccountType::Expense => NormalBalance::Debit,
            AccountType::Liability | AccountType::Equity | AccountType::Income => {
                NormalBalance::Credit
            }
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub normal_balance: NormalBalance,
    pub report_group: Option<String>,
    pub cashflow_activity: Option<String>,
    pub is_active: bool,
}

impl TenantScoped for Account {
    fn company_id(&self) -> CompanyId {
        CompanyId(self.company_id)
    }
}

#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub id: Uuid,
    pub company_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub reversal_of_journal_entry_id: Option<Uuid>,
    pub voided_at: Option<DateTime<Utc>>,
    pub void_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TenantScoped for JournalEntry {
    fn company_id(&self) -> CompanyId {
        CompanyId(self.company_id)
    }
}

#[derive(Debug, Clone)]
pub struct JournalLine {
    pub id: Uuid,
    pub company_id: Uuid,
    pub journal_entry_id: Uuid,
    pub account_id: Uuid,
    pub debit: Money,
    pub credit: Money,
}

/// A line as supplied by a caller building a new entry; `id` and
/// `journal_entry_id` are assigned at insert time.
#[derive(Debug, Clone)]
pub struct JournalLineInput {
    pub account_id: Uuid,
    pub debit: Money,
    pub credit: Money,
}

impl JournalLineInput {
    pub fn debit(account_id: Uuid, amount: Money) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Money::ZERO,
        }
    }

    pub fn credit(account_id: Uuid, amount: Money) -> Self {
        Self {
            account_id,
            debit: Money::ZERO,
            credit: amount,
        }
    }
}
