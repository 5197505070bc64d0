use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Transaction, UserSnapshot};
use crate::error::AppError;
use crate::ports::{TransactionRepository, UserRepository};
use crate::services::accrual::{total_active_interest, ActiveInterest};
use crate::services::balances::{compute_balances, Balances};

/// Everything the dashboard shows for one user at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub user_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub balances: Balances,
    pub active_interest: ActiveInterest,
}

/// Read path for the customer dashboard. Loads one consistent snapshot of the user
/// and their ledger and evaluates it against a single `now`.
#[derive(Clone)]
pub struct DashboardService {
    transactions: Arc<dyn TransactionRepository>,
    users: Arc<dyn UserRepository>,
}

impl DashboardService {
    pub fn new(transactions: Arc<dyn TransactionRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { transactions, users }
    }

    pub async fn snapshot(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<DashboardSnapshot, AppError> {
        let user = match self.users.get(user_id).await? {
            Some(user) => user,
            None => {
                tracing::debug!(user_id = %user_id, "No settled totals on record, using zero balances");
                UserSnapshot::default()
            }
        };
        let ledger = self.transactions.list_by_user(user_id).await?;

        let active_interest = total_active_interest(user_id, &ledger, now);
        let balances = compute_balances(&user, &active_interest.total)?;

        Ok(DashboardSnapshot {
            user_id,
            as_of: now,
            balances,
            active_interest,
        })
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<Transaction>, AppError> {
        Ok(self.transactions.list_by_user(user_id).await?)
    }
}
