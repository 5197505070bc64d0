//! Admin transitions over single transactions.
//!
//! Every function takes the current record by reference and returns new values; a
//! refused transition leaves the input untouched and reports `InvalidState`.

use bigdecimal::{BigDecimal, One};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::record::TransactionRecord;
use crate::domain::{LedgerError, PlanData, Transaction, TransactionStatus, TransactionType};
use crate::utils::time::{elapsed_fraction, parse_duration_days, term_end};
use crate::validation::{sanitize_string, validate_max_len, validate_required, REJECTION_REASON_MAX_LEN};

/// Outcome of completing a matured investment.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub investment: Transaction,
    pub payout: Transaction,
}

/// Outcome of cancelling an investment.
#[derive(Debug, Clone, PartialEq)]
pub struct Cancellation {
    pub investment: Transaction,
    pub refund: Transaction,
}

/// Outcome of rejecting a pending transaction. Investments have no rejected state,
/// so rejecting one cancels it and returns the principal.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub transaction: Transaction,
    pub refund: Option<Transaction>,
}

/// Uniform view of any adjudication: the updated record plus anything it emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Adjudicated {
    pub transaction: Transaction,
    pub emitted: Option<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdjudicatedRecord {
    pub transaction: TransactionRecord,
    pub emitted: Option<TransactionRecord>,
}

impl From<&Adjudicated> for AdjudicatedRecord {
    fn from(outcome: &Adjudicated) -> Self {
        Self {
            transaction: TransactionRecord::from(&outcome.transaction),
            emitted: outcome.emitted.as_ref().map(TransactionRecord::from),
        }
    }
}

/// Approves a pending transaction. Deposits and withdrawals settle; investments
/// become active and start accruing at `now`.
pub fn approve(tx: &Transaction, now: DateTime<Utc>) -> Result<Transaction, LedgerError> {
    require_pending(tx, "approve")?;

    match tx.transaction_type() {
        TransactionType::Deposit | TransactionType::Withdrawal => {
            Ok(tx.transition(TransactionStatus::Approved, "approve")?.settled(now))
        }
        TransactionType::Investment => {
            Ok(tx.transition(TransactionStatus::Active, "approve")?.activated(now))
        }
        other => Err(LedgerError::invalid_state(
            tx.id(),
            tx.status(),
            "approve",
            format!("a {} is never adjudicated", other),
        )),
    }
}

/// Rejects a pending transaction with a mandatory reason.
pub fn reject(tx: &Transaction, reason: &str, now: DateTime<Utc>) -> Result<Rejection, LedgerError> {
    require_pending(tx, "reject")?;

    let reason = sanitize_string(reason);
    validate_required("reason", &reason).map_err(|e| LedgerError::Validation(e.to_string()))?;
    validate_max_len("reason", &reason, REJECTION_REASON_MAX_LEN)
        .map_err(|e| LedgerError::Validation(e.to_string()))?;

    match tx.transaction_type() {
        TransactionType::Deposit | TransactionType::Withdrawal => Ok(Rejection {
            transaction: tx
                .transition(TransactionStatus::Rejected, "reject")?
                .settled(now)
                .with_rejection_reason(reason),
            refund: None,
        }),
        TransactionType::Investment => {
            let cancellation = cancel(tx, now)?;
            Ok(Rejection {
                transaction: cancellation.investment.with_rejection_reason(reason),
                refund: Some(cancellation.refund),
            })
        }
        other => Err(LedgerError::invalid_state(
            tx.id(),
            tx.status(),
            "reject",
            format!("a {} is never adjudicated", other),
        )),
    }
}

/// Settles a matured active investment, emitting a payout of the principal carrying
/// the full-term interest.
pub fn complete(investment: &Transaction, now: DateTime<Utc>) -> Result<Completion, LedgerError> {
    if investment.status() != TransactionStatus::Active {
        return Err(LedgerError::invalid_state(
            investment.id(),
            investment.status(),
            "complete",
            format!("status is {}, expected active", investment.status()),
        ));
    }

    let plan = investment_terms(investment, "complete")?;
    let days = parse_duration_days(&plan.duration)
        .map_err(|e| LedgerError::malformed(investment.id(), e.to_string()))?;
    if elapsed_fraction(investment.accrual_start(), days, now) < BigDecimal::one() {
        let reason = match term_end(investment.accrual_start(), days) {
            Some(maturity) => format!("term matures at {}", maturity.to_rfc3339()),
            None => format!("term of {} days has not matured", days),
        };
        return Err(LedgerError::invalid_state(
            investment.id(),
            investment.status(),
            "complete",
            reason,
        ));
    }

    let completed = investment
        .transition(TransactionStatus::Completed, "complete")?
        .settled(now);
    let payout = Transaction::payout_for(&completed, plan, now);

    Ok(Completion {
        investment: completed,
        payout,
    })
}

/// Cancels a pending or active investment and refunds the principal only.
pub fn cancel(investment: &Transaction, now: DateTime<Utc>) -> Result<Cancellation, LedgerError> {
    if investment.is_terminal() {
        return Err(LedgerError::invalid_state(
            investment.id(),
            investment.status(),
            "cancel",
            format!("status {} is terminal", investment.status()),
        ));
    }

    let plan = investment_terms(investment, "cancel")?;
    let cancelled = investment
        .transition(TransactionStatus::Cancelled, "cancel")?
        .settled(now);
    let refund = Transaction::refund_for(&cancelled, plan, now);

    Ok(Cancellation {
        investment: cancelled,
        refund,
    })
}

fn require_pending(tx: &Transaction, action: &'static str) -> Result<(), LedgerError> {
    if tx.status() != TransactionStatus::Pending {
        return Err(LedgerError::invalid_state(
            tx.id(),
            tx.status(),
            action,
            format!("status is {}, expected pending", tx.status()),
        ));
    }
    Ok(())
}

fn investment_terms<'a>(tx: &'a Transaction, action: &'static str) -> Result<&'a PlanData, LedgerError> {
    match (tx.transaction_type(), tx.plan_data()) {
        (TransactionType::Investment, Some(plan)) => Ok(plan),
        (other, _) => Err(LedgerError::invalid_state(
            tx.id(),
            tx.status(),
            action,
            format!("a {} is not an investment", other),
        )),
    }
}

impl From<Transaction> for Adjudicated {
    fn from(transaction: Transaction) -> Self {
        Self {
            transaction,
            emitted: None,
        }
    }
}

impl From<Completion> for Adjudicated {
    fn from(completion: Completion) -> Self {
        Self {
            transaction: completion.investment,
            emitted: Some(completion.payout),
        }
    }
}

impl From<Cancellation> for Adjudicated {
    fn from(cancellation: Cancellation) -> Self {
        Self {
            transaction: cancellation.investment,
            emitted: Some(cancellation.refund),
        }
    }
}

impl From<Rejection> for Adjudicated {
    fn from(rejection: Rejection) -> Self {
        Self {
            transaction: rejection.transaction,
            emitted: rejection.refund,
        }
    }
}
