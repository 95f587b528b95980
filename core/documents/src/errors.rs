use money_rs::Money;
use uuid::Uuid;

/// Stable error identifiers at the document/settlement boundary (spec §7).
/// Ledger and inventory errors are folded in via `#[from]` so a single
/// `kind()` call at the command boundary covers the whole posting path.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("invalid-input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    TenantScopeViolation(#[from] tenant_context::TenantScopeViolation),

    #[error("not-found: {0}")]
    NotFound(String),

    #[error("invalid-state-transition: {0}")]
    InvalidStateTransition(String),

    #[error("rounding-mismatch: stored total {stored} != recomputed total {recomputed}")]
    RoundingMismatch { stored: Money, recomputed: Money },

    #[error("currency-mismatch: document currency {document} differs from base currency {base}")]
    CurrencyMismatch { document: String, base: String },

    #[error("overpayment: settlement amount {amount} exceeds remaining balance {remaining} for document {document_id}")]
    Overpayment {
        document_id: Uuid,
        amount: Money,
        remaining: Money,
    },

    #[error("invalid-input: bank account {0} is a credit-card account and cannot source a vendor payment")]
    CreditCardCannotPayVendor(Uuid),

    #[error("invalid-input: landed cost allocation weight base is zero for bill {0}")]
    ZeroWeightBase(Uuid),

    #[error(transparent)]
    Ledger(#[from] gl_rs::LedgerError),

    #[error(transparent)]
    Inventory(#[from] inventory_rs::InventoryError),

    #[error(transparent)]
    Numbering(#[from] numbering::NumberingError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("event serialization error: {0}")]
    EventSerialization(#[from] serde_json::Error),
}

impl DocumentError {
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentError::InvalidInput(_) => "invalid-input",
            DocumentError::TenantScopeViolation(_) => "tenant-scope-violation",
            DocumentError::NotFound(_) => "not-found",
            DocumentError::InvalidStateTransition(_) => "invalid-state-transition",
            DocumentError::RoundingMismatch { .. } => "rounding-mismatch",
            DocumentError::CurrencyMismatch { .. } => "currency-mismatch",
            DocumentError::Overpayment { .. } => "overpayment",
            DocumentError::CreditCardCannotPayVendor(_) => "invalid-input",
            DocumentError::ZeroWeightBase(_) => "invalid-input",
            DocumentError::Ledger(e) => e.kind(),
            DocumentError::Inventory(e) => e.kind(),
            DocumentError::Numbering(_) => "internal",
            DocumentError::Database(_) => "internal",
            DocumentError::EventSerialization(_) => "internal",
        }
    }
}
