use thiserror::Error;
use uuid::Uuid;

use super::transaction::TransactionStatus;

/// Errors raised by the ledger model, accrual and adjudication rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid state: cannot {action} transaction {id} ({reason})")]
    InvalidState {
        id: Uuid,
        status: TransactionStatus,
        action: &'static str,
        reason: String,
    },

    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    #[error("Validation error: {0}")]
    Validation(String),
}

impl LedgerError {
    pub fn invalid_state(
        id: Uuid,
        status: TransactionStatus,
        action: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        LedgerError::InvalidState {
            id,
            status,
            action,
            reason: reason.into(),
        }
    }

    pub fn malformed(id: impl ToString, reason: impl Into<String>) -> Self {
        LedgerError::MalformedRecord {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_invalid_state(&self) -> bool {
        matches!(self, LedgerError::InvalidState { .. })
    }
}
