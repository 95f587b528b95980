pub mod bank_account_repo;
pub mod company_repo;
pub mod document_line_repo;
pub mod document_repo;
pub mod landed_cost_repo;
pub mod outbox_repo;
pub mod settlement_repo;
