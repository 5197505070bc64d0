use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use super::transaction::{Transaction, TransactionKind, TransactionStatus};

/// Settled totals for a user as kept by the account store. Read-only input to
/// balance aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// Settled principal.
    pub deposit: BigDecimal,
    /// Settled interest from completed investments.
    pub interest: BigDecimal,
}

impl Default for UserSnapshot {
    fn default() -> Self {
        Self {
            deposit: BigDecimal::zero(),
            interest: BigDecimal::zero(),
        }
    }
}

impl UserSnapshot {
    /// Totals after applying `settlement`. Refuses to take either total below zero.
    pub fn settle(&self, user_id: Uuid, settlement: &Settlement) -> Result<UserSnapshot, LedgerError> {
        let next = UserSnapshot {
            deposit: &self.deposit + &settlement.deposit,
            interest: &self.interest + &settlement.interest,
        };
        if next.deposit < BigDecimal::zero() || next.interest < BigDecimal::zero() {
            return Err(LedgerError::Validation(format!(
                "settlement would leave user {} with deposit {} and interest {}",
                user_id, next.deposit, next.interest
            )));
        }
        Ok(next)
    }
}

/// Signed change to a user's settled totals caused by one adjudication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub deposit: BigDecimal,
    pub interest: BigDecimal,
}

impl Settlement {
    /// What settling `tx` does to its owner's totals, if anything.
    ///
    /// Approved deposits add principal and approved withdrawals remove it. A payout
    /// moves the investment's full-term interest into settled interest. Investment
    /// principal never passes through the settled deposit, so refunds change nothing.
    pub fn for_transaction(tx: &Transaction) -> Option<Settlement> {
        match (tx.kind(), tx.status()) {
            (TransactionKind::Deposit(_), TransactionStatus::Approved) => Some(Settlement {
                deposit: tx.amount().clone(),
                interest: BigDecimal::zero(),
            }),
            (TransactionKind::Withdrawal(_), TransactionStatus::Approved) => Some(Settlement {
                deposit: -tx.amount().clone(),
                interest: BigDecimal::zero(),
            }),
            (TransactionKind::InvestmentPayout(plan), TransactionStatus::Completed) => Some(Settlement {
                deposit: BigDecimal::zero(),
                interest: plan.interest.clone(),
            }),
            _ => None,
        }
    }

    /// Folds the settlements of several transactions into one.
    pub fn combine<'a>(txs: impl IntoIterator<Item = &'a Transaction>) -> Option<Settlement> {
        txs.into_iter()
            .filter_map(Settlement::for_transaction)
            .reduce(|acc, next| Settlement {
                deposit: acc.deposit + next.deposit,
                interest: acc.interest + next.interest,
            })
    }

    pub fn reversed(&self) -> Settlement {
        Settlement {
            deposit: -self.deposit.clone(),
            interest: -self.interest.clone(),
        }
    }
}
