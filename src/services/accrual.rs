//! Live interest for active investments.
//!
//! Accrual is simple and linear across the term: an active investment has earned
//! `planData.interest * elapsed_fraction` at any instant. Nothing here is cached or
//! written back; callers evaluate a whole pass against a single `now`.

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::{LedgerError, Transaction, TransactionKind, TransactionStatus};
use crate::domain::transaction::ensure_non_negative;
use crate::utils::time::{elapsed_fraction, parse_duration_days};

/// Interest earned by `investment` up to `now`.
///
/// Pending and cancelled investments have earned nothing; a completed investment
/// reports its realized full-term interest.
pub fn live_interest(investment: &Transaction, now: DateTime<Utc>) -> Result<BigDecimal, LedgerError> {
    let plan = match investment.kind() {
        TransactionKind::Investment(plan) => plan,
        other => {
            return Err(LedgerError::malformed(
                investment.id(),
                format!("accrual requires an investment, got {}", other.transaction_type()),
            ))
        }
    };
    ensure_non_negative(investment.id(), "planData.interest", &plan.interest)?;

    match investment.status() {
        TransactionStatus::Pending | TransactionStatus::Cancelled => Ok(BigDecimal::zero()),
        TransactionStatus::Completed => Ok(plan.interest.clone()),
        TransactionStatus::Active => {
            let days = parse_duration_days(&plan.duration)
                .map_err(|e| LedgerError::malformed(investment.id(), e.to_string()))?;
            let fraction = elapsed_fraction(investment.accrual_start(), days, now);
            Ok(&plan.interest * &fraction)
        }
        status => Err(LedgerError::malformed(
            investment.id(),
            format!("an investment cannot be {}", status),
        )),
    }
}

/// Result of one accrual pass over a user's ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveInterest {
    pub total: BigDecimal,
    pub per_investment: BTreeMap<Uuid, BigDecimal>,
    pub active_count: usize,
    /// Active investments excluded because their records could not be evaluated.
    pub skipped: Vec<Uuid>,
}

impl Default for ActiveInterest {
    fn default() -> Self {
        Self {
            total: BigDecimal::zero(),
            per_investment: BTreeMap::new(),
            active_count: 0,
            skipped: Vec::new(),
        }
    }
}

/// Sums live interest over the active investments of `user_id`.
///
/// Transactions owned by other users are ignored. A record that fails evaluation is
/// logged and listed in `skipped`; the rest of the pass still counts.
pub fn total_active_interest<'a, I>(user_id: Uuid, transactions: I, now: DateTime<Utc>) -> ActiveInterest
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut result = ActiveInterest::default();

    for tx in transactions {
        if tx.user_id() != user_id
            || !matches!(tx.kind(), TransactionKind::Investment(_))
            || tx.status() != TransactionStatus::Active
        {
            continue;
        }

        match live_interest(tx, now) {
            Ok(interest) => {
                result.total += &interest;
                result.per_investment.insert(tx.id(), interest);
                result.active_count += 1;
            }
            Err(e) => {
                tracing::warn!(transaction_id = %tx.id(), error = %e, "Skipping investment in accrual pass");
                result.skipped.push(tx.id());
            }
        }
    }

    tracing::debug!(
        user_id = %user_id,
        active = result.active_count,
        skipped = result.skipped.len(),
        "Accrual pass complete"
    );

    result
}
