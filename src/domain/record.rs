//! Store-shaped transaction records.
//!
//! Records arrive loosely typed from the account store: every payload field is
//! optional and type/status are plain strings. Conversion into [`Transaction`]
//! rejects anything that does not match its type.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::LedgerError;
use super::transaction::{
    PlanData, Transaction, TransactionKind, TransactionParts, TransactionStatus, TransactionType,
    WalletData,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub user_id: Uuid,
    pub amount: BigDecimal,
    pub status: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_data: Option<WalletRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_data: Option<PlanRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settled_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub address: Option<String>,
    pub network: Option<String>,
    pub coin_name: Option<String>,
    pub converted_amount: Option<BigDecimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub plan: Option<String>,
    pub duration: Option<String>,
    pub interest: Option<BigDecimal>,
}

/// A record excluded from a batch, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub id: Uuid,
    pub error: LedgerError,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = LedgerError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let id = record.id;
        let tx_type: TransactionType = record
            .transaction_type
            .parse()
            .map_err(|e: String| LedgerError::malformed(id, e))?;
        let status: TransactionStatus = record
            .status
            .parse()
            .map_err(|e: String| LedgerError::malformed(id, e))?;

        let kind = match tx_type {
            TransactionType::Deposit => TransactionKind::Deposit(wallet_from(id, record.wallet_data)?),
            TransactionType::Withdrawal => {
                TransactionKind::Withdrawal(wallet_from(id, record.wallet_data)?)
            }
            TransactionType::Investment => TransactionKind::Investment(plan_from(id, record.plan_data)?),
            TransactionType::InvestmentPayout => {
                TransactionKind::InvestmentPayout(plan_from(id, record.plan_data)?)
            }
            TransactionType::InvestmentRefund => {
                TransactionKind::InvestmentRefund(plan_from(id, record.plan_data)?)
            }
        };

        Transaction::from_parts(TransactionParts {
            id,
            user_id: record.user_id,
            kind,
            amount: record.amount,
            status,
            created_at: record.date,
            activated_at: record.activated_at,
            settled_at: record.settled_at,
            rejection_reason: record.rejection_reason,
            related_id: record.related_id,
        })
    }
}

fn wallet_from(id: Uuid, wallet: Option<WalletRecord>) -> Result<WalletData, LedgerError> {
    let wallet = wallet.ok_or_else(|| LedgerError::malformed(id, "missing walletData"))?;
    Ok(WalletData {
        address: required(id, "walletData.address", wallet.address)?,
        network: required(id, "walletData.network", wallet.network)?,
        coin_name: required(id, "walletData.coinName", wallet.coin_name)?,
        converted_amount: required(id, "walletData.convertedAmount", wallet.converted_amount)?,
    })
}

fn plan_from(id: Uuid, plan: Option<PlanRecord>) -> Result<PlanData, LedgerError> {
    let plan = plan.ok_or_else(|| LedgerError::malformed(id, "missing planData"))?;
    Ok(PlanData {
        plan: required(id, "planData.plan", plan.plan)?,
        duration: required(id, "planData.duration", plan.duration)?,
        interest: required(id, "planData.interest", plan.interest)?,
    })
}

fn required<T>(id: Uuid, field: &str, value: Option<T>) -> Result<T, LedgerError> {
    value.ok_or_else(|| LedgerError::malformed(id, format!("missing {}", field)))
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        let (wallet_data, plan_data) = match tx.kind() {
            TransactionKind::Deposit(wallet) | TransactionKind::Withdrawal(wallet) => (
                Some(WalletRecord {
                    address: Some(wallet.address.clone()),
                    network: Some(wallet.network.clone()),
                    coin_name: Some(wallet.coin_name.clone()),
                    converted_amount: Some(wallet.converted_amount.clone()),
                }),
                None,
            ),
            TransactionKind::Investment(plan)
            | TransactionKind::InvestmentPayout(plan)
            | TransactionKind::InvestmentRefund(plan) => (
                None,
                Some(PlanRecord {
                    plan: Some(plan.plan.clone()),
                    duration: Some(plan.duration.clone()),
                    interest: Some(plan.interest.clone()),
                }),
            ),
        };

        Self {
            id: tx.id(),
            transaction_type: tx.transaction_type().to_string(),
            user_id: tx.user_id(),
            amount: tx.amount().clone(),
            status: tx.status().to_string(),
            date: tx.created_at(),
            wallet_data,
            plan_data,
            activated_at: tx.activated_at(),
            settled_at: tx.settled_at(),
            rejection_reason: tx.rejection_reason().map(str::to_string),
            related_id: tx.related_id(),
        }
    }
}

/// Converts a batch of records, excluding malformed ones so a single bad record
/// cannot blank out the rest of a user's ledger.
pub fn partition_records(records: Vec<TransactionRecord>) -> (Vec<Transaction>, Vec<RejectedRecord>) {
    let mut accepted = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        let id = record.id;
        match Transaction::try_from(record) {
            Ok(tx) => accepted.push(tx),
            Err(error) => {
                tracing::warn!(transaction_id = %id, error = %error, "Excluding malformed transaction record");
                rejected.push(RejectedRecord { id, error });
            }
        }
    }

    (accepted, rejected)
}
