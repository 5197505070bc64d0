//! Storage boundaries. The core only talks to these traits; adapters supply them.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{InvestmentPlan, Settlement, Transaction, TransactionStatus, UserSnapshot};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Internal(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction>;

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction>;

    /// All transactions owned by `user_id`, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Transaction>>;

    /// Replaces `updated` only if the stored record still has status `expected`, and
    /// inserts `emitted` in the same step. Fails with `Conflict` otherwise.
    async fn compare_and_swap(
        &self,
        expected: TransactionStatus,
        updated: &Transaction,
        emitted: Option<&Transaction>,
    ) -> RepositoryResult<()>;
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn list(&self) -> RepositoryResult<Vec<InvestmentPlan>>;

    async fn get(&self, id: Uuid) -> RepositoryResult<InvestmentPlan>;

    async fn insert(&self, plan: InvestmentPlan) -> RepositoryResult<InvestmentPlan>;

    async fn update(&self, plan: InvestmentPlan) -> RepositoryResult<InvestmentPlan>;

    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, user_id: Uuid) -> RepositoryResult<Option<UserSnapshot>>;

    async fn put(&self, user_id: Uuid, snapshot: UserSnapshot) -> RepositoryResult<()>;

    /// Applies `settlement` to the user's totals in one step, starting from zeros for
    /// an unknown user. Fails with `Conflict` if a total would go negative.
    async fn settle(&self, user_id: Uuid, settlement: &Settlement) -> RepositoryResult<UserSnapshot>;
}
