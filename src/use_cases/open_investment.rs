//! Open investment use case.
//! Freezes the chosen plan's terms onto a new pending investment.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Transaction;
use crate::error::AppError;
use crate::ports::{PlanRepository, TransactionRepository};
use crate::validation::{validate_positive_amount, ValidationError};

/// Input for the OpenInvestment use case.
#[derive(Debug)]
pub struct InvestmentInput {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub amount: BigDecimal,
}

pub struct OpenInvestment {
    transaction_repository: Arc<dyn TransactionRepository>,
    plan_repository: Arc<dyn PlanRepository>,
}

impl OpenInvestment {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepository>,
        plan_repository: Arc<dyn PlanRepository>,
    ) -> Self {
        Self {
            transaction_repository,
            plan_repository,
        }
    }

    pub async fn execute(&self, input: InvestmentInput, now: DateTime<Utc>) -> Result<Transaction, AppError> {
        validate_positive_amount("amount", &input.amount)?;
        let plan = self.plan_repository.get(input.plan_id).await?;

        if input.amount < plan.min_amount {
            return Err(ValidationError::new(
                "amount",
                format!("must be at least {} for plan {}", plan.min_amount, plan.name),
            )
            .into());
        }

        let terms = plan.snapshot(&input.amount);
        let tx = Transaction::investment(input.user_id, input.amount, terms, now)?;
        let inserted = self.transaction_repository.insert(&tx).await?;

        tracing::info!(
            transaction_id = %inserted.id(),
            user_id = %inserted.user_id(),
            plan = %plan.name,
            "Investment opened"
        );
        Ok(inserted)
    }
}
