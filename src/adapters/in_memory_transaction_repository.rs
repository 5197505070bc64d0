//! In-memory implementation of TransactionRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionStatus};
use crate::ports::{RepositoryError, RepositoryResult, TransactionRepository};

#[derive(Clone, Default)]
pub struct InMemoryTransactionRepository {
    rows: Arc<RwLock<HashMap<Uuid, Transaction>>>,
}

impl InMemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let rows = transactions.into_iter().map(|tx| (tx.id(), tx)).collect();
        Self {
            rows: Arc::new(RwLock::new(rows)),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> RepositoryResult<Transaction> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&tx.id()) {
            return Err(RepositoryError::Conflict(format!(
                "transaction {} already exists",
                tx.id()
            )));
        }
        rows.insert(tx.id(), tx.clone());
        Ok(tx.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Transaction> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("transaction {}", id)))
    }

    async fn list_by_user(&self, user_id: Uuid) -> RepositoryResult<Vec<Transaction>> {
        let mut owned: Vec<Transaction> = self
            .rows
            .read()
            .await
            .values()
            .filter(|tx| tx.user_id() == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(a.id().cmp(&b.id())));
        Ok(owned)
    }

    async fn compare_and_swap(
        &self,
        expected: TransactionStatus,
        updated: &Transaction,
        emitted: Option<&Transaction>,
    ) -> RepositoryResult<()> {
        let mut rows = self.rows.write().await;

        let stored = rows
            .get(&updated.id())
            .ok_or_else(|| RepositoryError::NotFound(format!("transaction {}", updated.id())))?;
        if stored.status() != expected {
            return Err(RepositoryError::Conflict(format!(
                "transaction {} is {}, expected {}",
                updated.id(),
                stored.status(),
                expected
            )));
        }
        if let Some(emitted) = emitted {
            if rows.contains_key(&emitted.id()) {
                return Err(RepositoryError::Conflict(format!(
                    "transaction {} already exists",
                    emitted.id()
                )));
            }
        }

        rows.insert(updated.id(), updated.clone());
        if let Some(emitted) = emitted {
            rows.insert(emitted.id(), emitted.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlanData;
    use crate::services::adjudication;
    use bigdecimal::BigDecimal;
    use chrono::Utc;

    fn investment(user_id: Uuid) -> Transaction {
        Transaction::investment(
            user_id,
            BigDecimal::from(300),
            PlanData {
                plan: "Silver".to_string(),
                duration: "14 days".to_string(),
                interest: BigDecimal::from(21),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_only_the_users_transactions() {
        let user = Uuid::new_v4();
        let repo = InMemoryTransactionRepository::with_transactions(vec![
            investment(user),
            investment(user),
            investment(Uuid::new_v4()),
        ]);

        assert_eq!(repo.list_by_user(user).await.unwrap().len(), 2);
        assert_eq!(repo.len().await, 3);
    }

    #[tokio::test]
    async fn compare_and_swap_rejects_stale_status() {
        let repo = InMemoryTransactionRepository::new();
        let pending = repo.insert(&investment(Uuid::new_v4())).await.unwrap();
        let active = adjudication::approve(&pending, Utc::now()).unwrap();

        repo.compare_and_swap(TransactionStatus::Pending, &active, None)
            .await
            .unwrap();
        let err = repo
            .compare_and_swap(TransactionStatus::Pending, &active, None)
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(
            repo.get_by_id(pending.id()).await.unwrap().status(),
            TransactionStatus::Active
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let repo = InMemoryTransactionRepository::new();
        assert!(matches!(
            repo.get_by_id(Uuid::new_v4()).await,
            Err(RepositoryError::NotFound(_))
        ));
    }
}
