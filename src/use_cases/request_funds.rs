//! Request funds use case.
//! Records a pending deposit or withdrawal for admin review.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Transaction, WalletData};
use crate::error::AppError;
use crate::ports::TransactionRepository;
use crate::validation::{validate_positive_amount, validate_wallet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundsDirection {
    Deposit,
    Withdrawal,
}

/// Input for the RequestFunds use case.
#[derive(Debug)]
pub struct FundsInput {
    pub user_id: Uuid,
    pub direction: FundsDirection,
    pub amount: BigDecimal,
    pub wallet: WalletData,
}

/// Use case for user-initiated deposits and withdrawals.
pub struct RequestFunds {
    transaction_repository: Arc<dyn TransactionRepository>,
}

impl RequestFunds {
    pub fn new(transaction_repository: Arc<dyn TransactionRepository>) -> Self {
        Self {
            transaction_repository,
        }
    }

    pub async fn execute(&self, input: FundsInput, now: DateTime<Utc>) -> Result<Transaction, AppError> {
        validate_positive_amount("amount", &input.amount)?;
        let wallet = validate_wallet(input.wallet)?;

        let tx = match input.direction {
            FundsDirection::Deposit => Transaction::deposit(input.user_id, input.amount, wallet, now)?,
            FundsDirection::Withdrawal => Transaction::withdrawal(input.user_id, input.amount, wallet, now)?,
        };
        let inserted = self.transaction_repository.insert(&tx).await?;

        tracing::info!(
            transaction_id = %inserted.id(),
            user_id = %inserted.user_id(),
            kind = %inserted.transaction_type(),
            "Funds request recorded"
        );
        Ok(inserted)
    }
}
