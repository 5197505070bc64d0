//! Ledger model: transactions, plans and the user snapshot consumed by aggregation.

pub mod error;
pub mod plan;
pub mod record;
pub mod transaction;
pub mod user;

pub use error::LedgerError;
pub use plan::{InvestmentPlan, PlanDraft};
pub use record::{partition_records, PlanRecord, RejectedRecord, TransactionRecord, WalletRecord};
pub use transaction::{
    PlanData, Transaction, TransactionKind, TransactionStatus, TransactionType, WalletData,
};
pub use user::{Settlement, UserSnapshot};
