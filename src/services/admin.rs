//! Admin adjudication over stored transactions.
//!
//! At most one adjudication runs per transaction id at a time. Each run re-reads the
//! record under that lock, applies the pure transition, settles the owner's totals and
//! persists the record with a compare-and-swap on the status it read. Requests may
//! carry an idempotency key; a retry with the same key replays the stored outcome
//! instead of re-applying it.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::Settlement;
use crate::error::AppError;
use crate::ports::{TransactionRepository, UserRepository};
use crate::services::adjudication::{self, Adjudicated};

const IDEMPOTENCY_TTL: Duration = Duration::from_secs(86400);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    Approve,
    Reject { reason: String },
    Complete,
    Cancel,
}

impl AdminAction {
    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::Approve => "approve",
            AdminAction::Reject { .. } => "reject",
            AdminAction::Complete => "complete",
            AdminAction::Cancel => "cancel",
        }
    }
}

struct StoredOutcome {
    fingerprint: String,
    /// `None` while the request that reserved the key is still running.
    outcome: Option<Adjudicated>,
    stored_at: Instant,
}

impl StoredOutcome {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < IDEMPOTENCY_TTL
    }
}

#[derive(Clone)]
pub struct AdjudicationService {
    transactions: Arc<dyn TransactionRepository>,
    users: Arc<dyn UserRepository>,
    locks: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
    outcomes: Arc<Mutex<HashMap<String, StoredOutcome>>>,
}

impl AdjudicationService {
    pub fn new(transactions: Arc<dyn TransactionRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            transactions,
            users,
            locks: Arc::new(Mutex::new(HashMap::new())),
            outcomes: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn adjudicate(
        &self,
        id: Uuid,
        action: AdminAction,
        now: DateTime<Utc>,
        idempotency_key: Option<&str>,
    ) -> Result<Adjudicated, AppError> {
        let fingerprint = fingerprint(&action, id);

        // Keys are global, so the reservation happens before the per-id lock.
        let reserved = match idempotency_key {
            Some(key) => self.reserve(key, &fingerprint).await?,
            None => false,
        };

        let lock = self.lock_for(id).await;
        let result = {
            let _guard = lock.lock().await;
            self.apply(id, &action, &fingerprint, now, idempotency_key).await
        };
        self.release(id, lock).await;

        if let Some(key) = idempotency_key {
            match &result {
                Ok(outcome) => self.remember(key, &fingerprint, outcome).await,
                Err(_) if reserved => self.forget(key).await,
                Err(_) => {}
            }
        }

        result
    }

    async fn apply(
        &self,
        id: Uuid,
        action: &AdminAction,
        fingerprint: &str,
        now: DateTime<Utc>,
        idempotency_key: Option<&str>,
    ) -> Result<Adjudicated, AppError> {
        if let Some(key) = idempotency_key {
            if let Some(previous) = self.replay(key, fingerprint).await {
                tracing::info!(
                    transaction_id = %id,
                    action = action.name(),
                    "Replaying stored adjudication for idempotency key"
                );
                return Ok(previous);
            }
        }

        let current = self.transactions.get_by_id(id).await?;
        let outcome: Adjudicated = match action {
            AdminAction::Approve => adjudication::approve(&current, now)?.into(),
            AdminAction::Reject { reason } => adjudication::reject(&current, reason, now)?.into(),
            AdminAction::Complete => adjudication::complete(&current, now)?.into(),
            AdminAction::Cancel => adjudication::cancel(&current, now)?.into(),
        };

        let settlement =
            Settlement::combine(std::iter::once(&outcome.transaction).chain(outcome.emitted.as_ref()));
        if let Some(settlement) = &settlement {
            self.users.settle(current.user_id(), settlement).await?;
        }

        if let Err(e) = self
            .transactions
            .compare_and_swap(current.status(), &outcome.transaction, outcome.emitted.as_ref())
            .await
        {
            if let Some(settlement) = &settlement {
                if let Err(undo) = self.users.settle(current.user_id(), &settlement.reversed()).await {
                    tracing::error!(
                        transaction_id = %id,
                        user_id = %current.user_id(),
                        error = %undo,
                        "Failed to reverse settlement after a refused status update"
                    );
                }
            }
            return Err(e.into());
        }

        tracing::info!(
            transaction_id = %id,
            action = action.name(),
            from = %current.status(),
            to = %outcome.transaction.status(),
            emitted = ?outcome.emitted.as_ref().map(|tx| tx.id()),
            settled = settlement.is_some(),
            "Transaction adjudicated"
        );

        Ok(outcome)
    }

    /// Claims `key` for this request. Returns whether this call made the claim; a key
    /// already claimed for another request is a `Conflict`.
    async fn reserve(&self, key: &str, fingerprint: &str) -> Result<bool, AppError> {
        let mut outcomes = self.outcomes.lock().await;
        outcomes.retain(|_, stored| stored.is_fresh());
        match outcomes.get(key) {
            Some(stored) if stored.fingerprint != fingerprint => Err(AppError::Conflict(format!(
                "idempotency key '{}' was already used for a different request",
                key
            ))),
            Some(_) => Ok(false),
            None => {
                outcomes.insert(
                    key.to_string(),
                    StoredOutcome {
                        fingerprint: fingerprint.to_string(),
                        outcome: None,
                        stored_at: Instant::now(),
                    },
                );
                Ok(true)
            }
        }
    }

    async fn replay(&self, key: &str, fingerprint: &str) -> Option<Adjudicated> {
        let outcomes = self.outcomes.lock().await;
        outcomes
            .get(key)
            .filter(|stored| stored.is_fresh() && stored.fingerprint == fingerprint)
            .and_then(|stored| stored.outcome.clone())
    }

    async fn remember(&self, key: &str, fingerprint: &str, outcome: &Adjudicated) {
        let mut outcomes = self.outcomes.lock().await;
        outcomes.insert(
            key.to_string(),
            StoredOutcome {
                fingerprint: fingerprint.to_string(),
                outcome: Some(outcome.clone()),
                stored_at: Instant::now(),
            },
        );
    }

    /// Drops a reservation whose request failed, so the key can be retried.
    async fn forget(&self, key: &str) {
        let mut outcomes = self.outcomes.lock().await;
        if matches!(outcomes.get(key), Some(stored) if stored.outcome.is_none()) {
            outcomes.remove(key);
        }
    }

    async fn lock_for(&self, id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(id).or_default().clone()
    }

    async fn release(&self, id: Uuid, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the map, one held here: nobody else is waiting.
        let idle = Arc::strong_count(&lock) == 2;
        drop(lock);
        if idle {
            locks.remove(&id);
        }
    }
}

fn fingerprint(action: &AdminAction, id: Uuid) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", action.name(), id).as_bytes());
    hex::encode(hasher.finalize())
}
