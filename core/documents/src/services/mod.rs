pub mod advance_service;
pub mod invoice_service;
pub mod line_calc;
pub mod purchase_bill_service;
pub mod settlement_service;
pub mod state_machine;
pub mod vendor_credit_service;
