//! Transaction domain entity.
//! A monetary event whose payload is fixed by its type and whose status only moves
//! along the per-type state machine.

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::LedgerError;
use crate::utils::time::parse_duration_days;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Investment,
    InvestmentPayout,
    InvestmentRefund,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Active,
    Completed,
    Rejected,
    Cancelled,
}

use TransactionStatus::*;

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Investment => "investment",
            TransactionType::InvestmentPayout => "investment_payout",
            TransactionType::InvestmentRefund => "investment_refund",
        }
    }

    /// Statuses a transaction of this type may ever hold.
    pub fn allowed_statuses(&self) -> &'static [TransactionStatus] {
        match self {
            TransactionType::Deposit | TransactionType::Withdrawal => &[Pending, Approved, Rejected],
            TransactionType::Investment => &[Pending, Active, Completed, Cancelled],
            TransactionType::InvestmentPayout | TransactionType::InvestmentRefund => &[Completed],
        }
    }

    pub fn initial_status(&self) -> TransactionStatus {
        match self {
            TransactionType::InvestmentPayout | TransactionType::InvestmentRefund => Completed,
            _ => Pending,
        }
    }

    pub fn is_terminal(&self, status: TransactionStatus) -> bool {
        match self {
            TransactionType::Deposit | TransactionType::Withdrawal => {
                matches!(status, Approved | Rejected)
            }
            TransactionType::Investment => matches!(status, Completed | Cancelled),
            TransactionType::InvestmentPayout | TransactionType::InvestmentRefund => true,
        }
    }

    pub fn can_transition(&self, from: TransactionStatus, to: TransactionStatus) -> bool {
        match self {
            TransactionType::Deposit | TransactionType::Withdrawal => {
                matches!((from, to), (Pending, Approved) | (Pending, Rejected))
            }
            TransactionType::Investment => matches!(
                (from, to),
                (Pending, Active) | (Pending, Cancelled) | (Active, Completed) | (Active, Cancelled)
            ),
            TransactionType::InvestmentPayout | TransactionType::InvestmentRefund => false,
        }
    }
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pending => "pending",
            Approved => "approved",
            Active => "active",
            Completed => "completed",
            Rejected => "rejected",
            Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionType::Deposit),
            "withdrawal" => Ok(TransactionType::Withdrawal),
            "investment" => Ok(TransactionType::Investment),
            "investment_payout" => Ok(TransactionType::InvestmentPayout),
            "investment_refund" => Ok(TransactionType::InvestmentRefund),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Pending),
            "approved" => Ok(Approved),
            "active" => Ok(Active),
            "completed" => Ok(Completed),
            "rejected" => Ok(Rejected),
            "cancelled" => Ok(Cancelled),
            other => Err(format!("unknown transaction status '{}'", other)),
        }
    }
}

/// Funding channel details for deposits and withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletData {
    pub address: String,
    pub network: String,
    pub coin_name: String,
    pub converted_amount: BigDecimal,
}

/// Plan terms frozen onto an investment. `interest` is the total promised for the
/// full term; partial interest is always derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanData {
    pub plan: String,
    pub duration: String,
    pub interest: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit(WalletData),
    Withdrawal(WalletData),
    Investment(PlanData),
    InvestmentPayout(PlanData),
    InvestmentRefund(PlanData),
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Deposit(_) => TransactionType::Deposit,
            TransactionKind::Withdrawal(_) => TransactionType::Withdrawal,
            TransactionKind::Investment(_) => TransactionType::Investment,
            TransactionKind::InvestmentPayout(_) => TransactionType::InvestmentPayout,
            TransactionKind::InvestmentRefund(_) => TransactionType::InvestmentRefund,
        }
    }

    pub fn wallet_data(&self) -> Option<&WalletData> {
        match self {
            TransactionKind::Deposit(wallet) | TransactionKind::Withdrawal(wallet) => Some(wallet),
            _ => None,
        }
    }

    pub fn plan_data(&self) -> Option<&PlanData> {
        match self {
            TransactionKind::Investment(plan)
            | TransactionKind::InvestmentPayout(plan)
            | TransactionKind::InvestmentRefund(plan) => Some(plan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: Uuid,
    user_id: Uuid,
    kind: TransactionKind,
    amount: BigDecimal,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
    settled_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    related_id: Option<Uuid>,
}

/// Every field of a stored transaction, used when rebuilding one from a record.
pub(crate) struct TransactionParts {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub amount: BigDecimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub related_id: Option<Uuid>,
}

impl Transaction {
    pub fn deposit(
        user_id: Uuid,
        amount: BigDecimal,
        wallet: WalletData,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        Self::create(user_id, TransactionKind::Deposit(wallet), amount, now)
    }

    pub fn withdrawal(
        user_id: Uuid,
        amount: BigDecimal,
        wallet: WalletData,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        Self::create(user_id, TransactionKind::Withdrawal(wallet), amount, now)
    }

    pub fn investment(
        user_id: Uuid,
        amount: BigDecimal,
        plan: PlanData,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        Self::create(user_id, TransactionKind::Investment(plan), amount, now)
    }

    fn create(
        user_id: Uuid,
        kind: TransactionKind,
        amount: BigDecimal,
        now: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        let id = Uuid::new_v4();
        Self::from_parts(TransactionParts {
            id,
            user_id,
            status: kind.transaction_type().initial_status(),
            kind,
            amount,
            created_at: now,
            activated_at: None,
            settled_at: None,
            rejection_reason: None,
            related_id: None,
        })
    }

    /// Validates money fields, plan terms and the status/type pairing before building
    /// the entity.
    pub(crate) fn from_parts(parts: TransactionParts) -> Result<Self, LedgerError> {
        let tx_type = parts.kind.transaction_type();

        ensure_non_negative(parts.id, "amount", &parts.amount)?;
        match &parts.kind {
            TransactionKind::Deposit(wallet) | TransactionKind::Withdrawal(wallet) => {
                ensure_non_negative(parts.id, "walletData.convertedAmount", &wallet.converted_amount)?;
            }
            TransactionKind::Investment(plan)
            | TransactionKind::InvestmentPayout(plan)
            | TransactionKind::InvestmentRefund(plan) => {
                ensure_non_negative(parts.id, "planData.interest", &plan.interest)?;
                parse_duration_days(&plan.duration)
                    .map_err(|e| LedgerError::malformed(parts.id, e.to_string()))?;
            }
        }

        if !tx_type.allowed_statuses().contains(&parts.status) {
            return Err(LedgerError::malformed(
                parts.id,
                format!("status '{}' is not valid for a {}", parts.status, tx_type),
            ));
        }

        Ok(Self {
            id: parts.id,
            user_id: parts.user_id,
            kind: parts.kind,
            amount: parts.amount,
            status: parts.status,
            created_at: parts.created_at,
            activated_at: parts.activated_at,
            settled_at: parts.settled_at,
            rejection_reason: parts.rejection_reason,
            related_id: parts.related_id,
        })
    }

    /// Completed payout settling `investment` at its principal and full-term interest.
    pub(crate) fn payout_for(investment: &Transaction, plan: &PlanData, now: DateTime<Utc>) -> Self {
        Self::settlement_event(investment, TransactionKind::InvestmentPayout(plan.clone()), now)
    }

    /// Completed refund returning the principal of `investment`; carries no interest.
    pub(crate) fn refund_for(investment: &Transaction, plan: &PlanData, now: DateTime<Utc>) -> Self {
        let terms = PlanData {
            plan: plan.plan.clone(),
            duration: plan.duration.clone(),
            interest: BigDecimal::zero(),
        };
        Self::settlement_event(investment, TransactionKind::InvestmentRefund(terms), now)
    }

    fn settlement_event(investment: &Transaction, kind: TransactionKind, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: investment.user_id,
            status: kind.transaction_type().initial_status(),
            kind,
            amount: investment.amount.clone(),
            created_at: now,
            activated_at: None,
            settled_at: Some(now),
            rejection_reason: None,
            related_id: Some(investment.id),
        }
    }

    /// Copy of this transaction moved to `to`, if the state machine allows it.
    pub(crate) fn transition(
        &self,
        to: TransactionStatus,
        action: &'static str,
    ) -> Result<Self, LedgerError> {
        let tx_type = self.transaction_type();
        if !tx_type.can_transition(self.status, to) {
            return Err(LedgerError::invalid_state(
                self.id,
                self.status,
                action,
                format!("a {} cannot move from {} to {}", tx_type, self.status, to),
            ));
        }

        let mut next = self.clone();
        next.status = to;
        Ok(next)
    }

    pub(crate) fn activated(mut self, at: DateTime<Utc>) -> Self {
        self.activated_at = Some(at);
        self
    }

    pub(crate) fn settled(mut self, at: DateTime<Utc>) -> Self {
        self.settled_at = Some(at);
        self
    }

    pub(crate) fn with_rejection_reason(mut self, reason: String) -> Self {
        self.rejection_reason = Some(reason);
        self
    }

    /// Swaps the plan terms without validation, for exercising readers against
    /// records that slipped past the constructors.
    #[cfg(test)]
    pub(crate) fn with_unchecked_plan(mut self, plan: PlanData) -> Self {
        if let TransactionKind::Investment(terms) = &mut self.kind {
            *terms = plan;
        }
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn kind(&self) -> &TransactionKind {
        &self.kind
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn activated_at(&self) -> Option<DateTime<Utc>> {
        self.activated_at
    }

    pub fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.settled_at
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn related_id(&self) -> Option<Uuid> {
        self.related_id
    }

    pub fn plan_data(&self) -> Option<&PlanData> {
        self.kind.plan_data()
    }

    pub fn wallet_data(&self) -> Option<&WalletData> {
        self.kind.wallet_data()
    }

    pub fn is_terminal(&self) -> bool {
        self.transaction_type().is_terminal(self.status)
    }

    /// Interest accrues from activation; records activated before the timestamp was
    /// tracked fall back to their creation date.
    pub fn accrual_start(&self) -> DateTime<Utc> {
        self.activated_at.unwrap_or(self.created_at)
    }
}

pub(crate) fn ensure_non_negative(
    id: impl ToString,
    field: &str,
    value: &BigDecimal,
) -> Result<(), LedgerError> {
    if value < &BigDecimal::zero() {
        return Err(LedgerError::malformed(
            id,
            format!("{} must not be negative (got {})", field, value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_terms() -> PlanData {
        PlanData {
            plan: "Basic".to_string(),
            duration: "30".to_string(),
            interest: BigDecimal::from(100),
        }
    }

    #[test]
    fn new_investment_starts_pending() {
        let tx = Transaction::investment(Uuid::new_v4(), BigDecimal::from(1000), plan_terms(), Utc::now())
            .unwrap();
        assert_eq!(tx.status(), Pending);
        assert_eq!(tx.transaction_type(), TransactionType::Investment);
        assert_eq!(tx.accrual_start(), tx.created_at());
        assert!(!tx.is_terminal());
    }

    #[test]
    fn negative_amount_is_malformed() {
        let err = Transaction::investment(Uuid::new_v4(), BigDecimal::from(-1), plan_terms(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::MalformedRecord { .. }));
    }

    #[test]
    fn negative_interest_is_malformed() {
        let mut terms = plan_terms();
        terms.interest = BigDecimal::from(-5);
        let err = Transaction::investment(Uuid::new_v4(), BigDecimal::from(10), terms, Utc::now())
            .unwrap_err();
        assert!(matches!(err, LedgerError::MalformedRecord { .. }));
    }

    #[test]
    fn unparseable_duration_is_malformed() {
        for duration in ["soon", "300000 years"] {
            let mut terms = plan_terms();
            terms.duration = duration.to_string();
            let err = Transaction::investment(Uuid::new_v4(), BigDecimal::from(10), terms, Utc::now())
                .unwrap_err();
            assert!(matches!(err, LedgerError::MalformedRecord { .. }), "{}", duration);
        }
    }

    #[test]
    fn state_machine_table() {
        use TransactionType::*;

        assert!(Deposit.can_transition(Pending, Approved));
        assert!(Withdrawal.can_transition(Pending, Rejected));
        assert!(!Deposit.can_transition(Approved, Rejected));
        assert!(!Deposit.can_transition(Pending, Active));

        assert!(Investment.can_transition(Pending, Active));
        assert!(Investment.can_transition(Active, Completed));
        assert!(Investment.can_transition(Active, Cancelled));
        assert!(!Investment.can_transition(Completed, Active));
        assert!(!Investment.can_transition(Cancelled, Pending));
        assert!(!Investment.can_transition(Pending, Completed));

        assert!(!InvestmentPayout.can_transition(Completed, Cancelled));
        assert_eq!(InvestmentRefund.initial_status(), Completed);
    }

    #[test]
    fn terminal_statuses_never_transition() {
        let types = [
            TransactionType::Deposit,
            TransactionType::Withdrawal,
            TransactionType::Investment,
            TransactionType::InvestmentPayout,
            TransactionType::InvestmentRefund,
        ];
        let statuses = [Pending, Approved, Active, Completed, Rejected, Cancelled];

        for tx_type in types {
            for from in statuses.iter().filter(|s| tx_type.is_terminal(**s)) {
                for to in statuses {
                    assert!(!tx_type.can_transition(*from, to), "{} {} -> {}", tx_type, from, to);
                }
            }
        }
    }

    #[test]
    fn parses_and_displays_wire_names() {
        assert_eq!("investment_payout".parse::<TransactionType>(), Ok(TransactionType::InvestmentPayout));
        assert_eq!("cancelled".parse::<TransactionStatus>(), Ok(Cancelled));
        assert!("canceled".parse::<TransactionStatus>().is_err());
        assert_eq!(TransactionType::InvestmentRefund.to_string(), "investment_refund");
    }
}
