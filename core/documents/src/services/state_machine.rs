//! The shared transition table every document kind obeys (spec §4.9).
//! Kind-specific posting logic lives in each document's service module;
//! this module only decides whether a transition is *allowed*.

use crate::errors::DocumentError;
use crate::types::{DocumentHeader, DocumentStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    Approve,
    Post,
    Adjust,
    Void,
    Settle,
    EditContent,
    Delete,
}

/// Checks whether `event` is allowed from `header`'s current status,
/// returning the resulting status on success. Does not mutate anything —
/// callers apply the side effects (posting, stock moves, settlement) and
/// persist the new status themselves once those succeed.
pub fn check_transition(
    header: &DocumentHeader,
    event: DocumentEvent,
) -> Result<DocumentStatus, DocumentError> {
    use DocumentStatus::*;

    match (header.status, event) {
        (Draft, DocumentEvent::Approve) => Ok(Approved),
        (Draft, DocumentEvent::Post) | (Approved, DocumentEvent::Post) => Ok(Posted),
        (Posted, DocumentEvent::Adjust) => Ok(Posted),
        (Posted, DocumentEvent::Void) | (Partial, DocumentEvent::Void) => Ok(Void),
        (Posted, DocumentEvent::Settle) | (Partial, DocumentEvent::Settle) => {
            // Resulting status (Partial/Paid) is decided by the caller once
            // it knows the post-settlement remaining balance.
            Ok(header.status)
        }
        (Draft, DocumentEvent::EditContent) | (Approved, DocumentEvent::EditContent) => {
            if header.journal_entry_id.is_some() {
                Err(DocumentError::InvalidStateTransition(
                    "cannot edit content once a journal entry is linked".to_string(),
                ))
            } else {
                Ok(header.status)
            }
        }
        (_, DocumentEvent::Delete) => {
            if header.is_deletable() {
                Ok(header.status)
            } else {
                Err(DocumentError::InvalidStateTransition(format!(
                    "document {} cannot be deleted from status {:?}",
                    header.id, header.status
                )))
            }
        }
        (from, event) => Err(DocumentError::InvalidStateTransition(format!(
            "{event:?} is not valid from status {from:?}"
        ))),
    }
}

/// `Paid` when the remaining balance is zero, `Partial` otherwise. Called
/// after a settlement recomputes `remaining` under the document row lock.
pub fn status_after_settlement(remaining: money_rs::Money) -> DocumentStatus {
    if remaining.is_zero() {
        DocumentStatus::Paid
    } else {
        DocumentStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn header(status: DocumentStatus, journal_entry_id: Option<Uuid>) -> DocumentHeader {
        DocumentHeader {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            kind: crate::types::DocumentKind::Invoice,
            number: "INV-000001".to_string(),
            status,
            date: chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            total: rust_decimal::Decimal::ZERO,
            amount_settled: rust_decimal::Decimal::ZERO,
            journal_entry_id,
            last_adjustment_journal_entry_id: None,
            void_journal_entry_id: None,
            location_id: Uuid::new_v4(),
            currency: None,
            linked_receipt_id: None,
            bank_account_id: None,
            clearing_account_id: None,
            tax_account_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn draft_can_approve_and_post_but_not_void() {
        let h = header(DocumentStatus::Draft, None);
        assert_eq!(
            check_transition(&h, DocumentEvent::Approve).unwrap(),
            DocumentStatus::Approved
        );
        assert_eq!(
            check_transition(&h, DocumentEvent::Post).unwrap(),
            DocumentStatus::Posted
        );
        assert!(check_transition(&h, DocumentEvent::Void).is_err());
    }

    #[test]
    fn posted_can_adjust_void_or_settle() {
        let h = header(DocumentStatus::Posted, Some(Uuid::new_v4()));
        assert!(check_transition(&h, DocumentEvent::Adjust).is_ok());
        assert!(check_transition(&h, DocumentEvent::Void).is_ok());
        assert!(check_transition(&h, DocumentEvent::Settle).is_ok());
        assert!(check_transition(&h, DocumentEvent::Approve).is_err());
    }

    #[test]
    fn editing_content_is_rejected_once_a_journal_entry_is_linked() {
        let h = header(DocumentStatus::Approved, Some(Uuid::new_v4()));
        assert!(matches!(
            check_transition(&h, DocumentEvent::EditContent),
            Err(DocumentError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn delete_requires_draft_or_approved_with_no_settlement_and_no_je() {
        let deletable = header(DocumentStatus::Draft, None);
        assert!(check_transition(&deletable, DocumentEvent::Delete).is_ok());

        let posted = header(DocumentStatus::Posted, Some(Uuid::new_v4()));
        assert!(check_transition(&posted, DocumentEvent::Delete).is_err());
    }

    #[test]
    fn status_after_settlement_reflects_zero_vs_positive_remaining() {
        assert_eq!(
            status_after_settlement(money_rs::Money::ZERO),
            DocumentStatus::Paid
        );
        assert_eq!(
            status_after_settlement(money_rs::Money::parse("10.00").unwrap()),
            DocumentStatus::Partial
        );
    }
}
