//! Startup data for the in-memory repositories.
//!
//! The seed file is JSON in the account store's record shape:
//! `{ "plans": [...], "users": [{ "id", "deposit", "interest" }], "transactions": [...] }`.
//! Every section is optional. Plans go through the same validation as admin-created
//! ones and a bad plan fails the load. Malformed transaction records are left out and
//! logged.

use anyhow::Context;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use std::path::Path;
use uuid::Uuid;

use crate::adapters::{InMemoryPlanRepository, InMemoryTransactionRepository, InMemoryUserRepository};
use crate::domain::record::{partition_records, RejectedRecord, TransactionRecord};
use crate::domain::{InvestmentPlan, PlanDraft, UserSnapshot};
use crate::ports::UserRepository;
use crate::validation::validate_plan_draft;

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub plans: Vec<InvestmentPlan>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub id: Uuid,
    pub deposit: BigDecimal,
    pub interest: BigDecimal,
}

pub struct Repositories {
    pub transactions: InMemoryTransactionRepository,
    pub plans: InMemoryPlanRepository,
    pub users: InMemoryUserRepository,
    pub rejected: Vec<RejectedRecord>,
}

impl SeedFile {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("invalid seed file {}", path.display()))
    }

    pub async fn into_repositories(self) -> anyhow::Result<Repositories> {
        let plans = self
            .plans
            .into_iter()
            .map(validated_plan)
            .collect::<anyhow::Result<Vec<_>>>()?;
        let (transactions, rejected) = partition_records(self.transactions);

        let users = InMemoryUserRepository::new();
        for user in self.users {
            users
                .put(
                    user.id,
                    UserSnapshot {
                        deposit: user.deposit,
                        interest: user.interest,
                    },
                )
                .await?;
        }

        tracing::info!(
            plans = plans.len(),
            transactions = transactions.len(),
            rejected = rejected.len(),
            "Seed data loaded"
        );

        Ok(Repositories {
            transactions: InMemoryTransactionRepository::with_transactions(transactions),
            plans: InMemoryPlanRepository::new(plans),
            users,
            rejected,
        })
    }
}

fn validated_plan(plan: InvestmentPlan) -> anyhow::Result<InvestmentPlan> {
    let id = plan.id;
    let draft = validate_plan_draft(PlanDraft {
        name: plan.name,
        roi: plan.roi,
        min_amount: plan.min_amount,
        duration: plan.duration,
        features: plan.features,
        icon: plan.icon,
    })
    .with_context(|| format!("invalid seed plan {}", id))?;
    Ok(InvestmentPlan::from_draft(id, draft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PlanRepository, TransactionRepository};
    use std::io::Write;

    const SEED: &str = r#"{
        "plans": [{
            "id": "5f0c3a4e-8d7b-4a55-9f5e-0c8a7d1e2b3c",
            "name": "Gold",
            "roi": "15",
            "minAmount": "1000",
            "duration": "3 months",
            "features": ["Priority support"]
        }],
        "users": [{
            "id": "0b9e4c1a-3f2d-4e6b-8a7c-1d2e3f4a5b6c",
            "deposit": "500",
            "interest": "20"
        }],
        "transactions": [
            {
                "id": "7a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d",
                "type": "investment",
                "userId": "0b9e4c1a-3f2d-4e6b-8a7c-1d2e3f4a5b6c",
                "amount": "1000",
                "status": "active",
                "date": "2024-01-01T00:00:00Z",
                "planData": { "plan": "Gold", "duration": "30", "interest": "100" }
            },
            {
                "id": "8b2c3d4e-5f6a-4b7c-9d8e-0f1a2b3c4d5e",
                "type": "investment",
                "userId": "0b9e4c1a-3f2d-4e6b-8a7c-1d2e3f4a5b6c",
                "amount": "1000",
                "status": "active",
                "date": "2024-01-01T00:00:00Z"
            }
        ]
    }"#;

    #[tokio::test]
    async fn loads_seed_and_drops_malformed_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let repos = SeedFile::from_path(file.path()).unwrap().into_repositories().await.unwrap();

        assert_eq!(repos.plans.list().await.unwrap().len(), 1);
        assert_eq!(repos.transactions.len().await, 1);
        assert_eq!(repos.rejected.len(), 1);

        let user_id: Uuid = "0b9e4c1a-3f2d-4e6b-8a7c-1d2e3f4a5b6c".parse().unwrap();
        let user = repos.users.get(user_id).await.unwrap().unwrap();
        assert_eq!(user.deposit, BigDecimal::from(500));
        assert_eq!(repos.transactions.list_by_user(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_seed_plan_fails_the_load() {
        for (roi, duration) in [("-5", "30 days"), ("10", "whenever")] {
            let seed: SeedFile = serde_json::from_str(&format!(
                r#"{{ "plans": [{{
                    "id": "5f0c3a4e-8d7b-4a55-9f5e-0c8a7d1e2b3c",
                    "name": "Broken",
                    "roi": "{}",
                    "minAmount": "100",
                    "duration": "{}"
                }}] }}"#,
                roi, duration
            ))
            .unwrap();

            let err = seed.into_repositories().await.err().unwrap();
            assert!(err.to_string().contains("invalid seed plan"), "{}", err);
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(SeedFile::from_path(Path::new("/nonexistent/seed.json")).is_err());
    }
}
