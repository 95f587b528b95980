//! Double-entry journal posting: the write path every document-posting
//! flow funnels through, plus reversal, net-delta adjustment, and the
//! period-close guard.

pub mod errors;
pub mod repos;
pub mod services;
pub mod types;

pub use errors::LedgerError;
pub use services::journal_service::{post_journal_entry, PostJournalEntryInput};
pub use services::period_close_service::{assert_open_period, close_period, PeriodAction};
pub use services::reversal_service::{compute_net_delta_lines, create_reversal, CreateReversalInput};
pub use types::{Account, AccountType, JournalEntry, JournalLine, JournalLineInput, NormalBalance};
