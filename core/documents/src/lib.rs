//! Document state machines and the settlement ledger: invoices, purchase
//! bills (standalone and linked-receipt), vendor credits, and customer/
//! vendor advances, all sharing one transition table and one settlement
//! template over journal entries posted through `gl_rs`.

pub mod errors;
pub mod repos;
pub mod services;
pub mod types;

pub use errors::DocumentError;
pub use services::advance_service::{
    CreateCustomerAdvanceInput, CreateVendorAdvanceInput,
};
pub use services::invoice_service::CreateInvoiceInput;
pub use services::purchase_bill_service::CreatePurchaseBillInput;
pub use services::settlement_service::{PaymentDirection, SettlementOutcome};
pub use services::state_machine::{check_transition, DocumentEvent};
pub use services::vendor_credit_service::CreateVendorCreditInput;
pub use types::{
    BankAccount, BankAccountKind, Company, ComputedLine, DocumentHeader, DocumentKind,
    DocumentLineInput, DocumentLineRow, DocumentStatus, LandedCostAllocation, Settlement,
    SettlementKind,
};
