//! Plan catalog held in an atomically swapped map: reads never block, writes
//! publish a fresh copy.

use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::InvestmentPlan;
use crate::ports::{PlanRepository, RepositoryError, RepositoryResult};

pub struct InMemoryPlanRepository {
    inner: ArcSwap<HashMap<Uuid, InvestmentPlan>>,
}

impl InMemoryPlanRepository {
    pub fn new(plans: impl IntoIterator<Item = InvestmentPlan>) -> Self {
        let map: HashMap<Uuid, InvestmentPlan> = plans.into_iter().map(|p| (p.id, p)).collect();
        Self {
            inner: ArcSwap::from_pointee(map),
        }
    }
}

impl Default for InMemoryPlanRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl PlanRepository for InMemoryPlanRepository {
    async fn list(&self) -> RepositoryResult<Vec<InvestmentPlan>> {
        let mut plans: Vec<InvestmentPlan> = self.inner.load().values().cloned().collect();
        plans.sort_by(|a, b| a.min_amount.cmp(&b.min_amount).then_with(|| a.name.cmp(&b.name)));
        Ok(plans)
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<InvestmentPlan> {
        self.inner
            .load()
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("plan {}", id)))
    }

    async fn insert(&self, plan: InvestmentPlan) -> RepositoryResult<InvestmentPlan> {
        let mut conflict = false;
        self.inner.rcu(|current| {
            let mut next = HashMap::clone(current);
            conflict = next.contains_key(&plan.id);
            if !conflict {
                next.insert(plan.id, plan.clone());
            }
            next
        });

        if conflict {
            return Err(RepositoryError::Conflict(format!("plan {} already exists", plan.id)));
        }
        Ok(plan)
    }

    async fn update(&self, plan: InvestmentPlan) -> RepositoryResult<InvestmentPlan> {
        let mut found = false;
        self.inner.rcu(|current| {
            let mut next = HashMap::clone(current);
            found = next.contains_key(&plan.id);
            if found {
                next.insert(plan.id, plan.clone());
            }
            next
        });

        if !found {
            return Err(RepositoryError::NotFound(format!("plan {}", plan.id)));
        }
        Ok(plan)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut found = false;
        self.inner.rcu(|current| {
            let mut next = HashMap::clone(current);
            found = next.remove(&id).is_some();
            next
        });

        if !found {
            return Err(RepositoryError::NotFound(format!("plan {}", id)));
        }
        Ok(())
    }
}
