pub mod journal_service;
pub mod period_close_service;
pub mod reversal_service;
