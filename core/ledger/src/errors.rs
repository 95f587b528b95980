use chrono::NaiveDate;
use money_rs::Money;
use uuid::Uuid;

/// Stable error identifiers surfaced at the command boundary. The enum
/// variant drives `kind()`; callers translating to HTTP map `kind()`
/// directly rather than matching on the variant itself, so adding a new
/// internal variant never changes a stable identifier already in use.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid-input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    TenantScopeViolation(#[from] tenant_context::TenantScopeViolation),

    #[error("not-found: {0}")]
    NotFound(String),

    #[error("invalid-state-transition: {0}")]
    InvalidStateTransition(String),

    #[error("period-closed: {transaction_date} falls on or before the close date {closed_through}")]
    PeriodClosed {
        transaction_date: NaiveDate,
        closed_through: NaiveDate,
    },

    #[error("period-already-closed: {from}..{to} overlaps an existing close")]
    PeriodAlreadyClosed { from: NaiveDate, to: NaiveDate },

    #[error("unbalanced-entry: debits {debit} != credits {credit}")]
    UnbalancedEntry { debit: Money, credit: Money },

    #[error("invalid-line: {0}")]
    InvalidLine(String),

    #[error("account-not-in-company: {0}")]
    AccountNotInCompany(Uuid),

    #[error("rounding-mismatch: stored total {stored} != recomputed total {recomputed}")]
    RoundingMismatch { stored: Money, recomputed: Money },

    #[error("already-reversed: journal entry {0} already has a reversal")]
    AlreadyReversed(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("event serialization error: {0}")]
    EventSerialization(#[from] serde_json::Error),
}

impl LedgerError {
    /// The stable identifier from the error taxonomy (spec §7), independent
    /// of the variant's `Display` message.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::InvalidInput(_) => "invalid-input",
            LedgerError::TenantScopeViolation(_) => "tenant-scope-violation",
            LedgerError::NotFound(_) => "not-found",
            LedgerError::InvalidStateTransition(_) => "invalid-state-transition",
            LedgerError::PeriodClosed { .. } => "period-closed",
            LedgerError::PeriodAlreadyClosed { .. } => "period-closed",
            LedgerError::UnbalancedEntry { .. } => "unbalanced-entry",
            LedgerError::InvalidLine(_) => "invalid-input",
            LedgerError::AccountNotInCompany(_) => "tenant-scope-violation",
            LedgerError::RoundingMismatch { .. } => "rounding-mismatch",
            LedgerError::AlreadyReversed(_) => "invalid-state-transition",
            LedgerError::Database(_) => "internal",
            LedgerError::EventSerialization(_) => "internal",
        }
    }
}
