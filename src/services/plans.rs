use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{InvestmentPlan, PlanDraft};
use crate::error::AppError;
use crate::ports::PlanRepository;
use crate::validation::validate_plan_draft;

/// Admin management of plan templates. Investments keep their own snapshot of the
/// terms, so edits and deletions here never touch existing ledger entries.
#[derive(Clone)]
pub struct PlanCatalog {
    plans: Arc<dyn PlanRepository>,
}

impl PlanCatalog {
    pub fn new(plans: Arc<dyn PlanRepository>) -> Self {
        Self { plans }
    }

    pub async fn list(&self) -> Result<Vec<InvestmentPlan>, AppError> {
        Ok(self.plans.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<InvestmentPlan, AppError> {
        Ok(self.plans.get(id).await?)
    }

    pub async fn create(&self, draft: PlanDraft) -> Result<InvestmentPlan, AppError> {
        let draft = validate_plan_draft(draft)?;
        let plan = self
            .plans
            .insert(InvestmentPlan::from_draft(Uuid::new_v4(), draft))
            .await?;

        tracing::info!(plan_id = %plan.id, name = %plan.name, "Investment plan created");
        Ok(plan)
    }

    pub async fn update(&self, id: Uuid, draft: PlanDraft) -> Result<InvestmentPlan, AppError> {
        let draft = validate_plan_draft(draft)?;
        let plan = self.plans.update(InvestmentPlan::from_draft(id, draft)).await?;

        tracing::info!(plan_id = %plan.id, name = %plan.name, "Investment plan updated");
        Ok(plan)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.plans.delete(id).await?;

        tracing::info!(plan_id = %id, "Investment plan deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryPlanRepository;
    use bigdecimal::BigDecimal;

    fn draft(name: &str, min_amount: i64) -> PlanDraft {
        PlanDraft {
            name: name.to_string(),
            roi: BigDecimal::from(10),
            min_amount: BigDecimal::from(min_amount),
            duration: "30 days".to_string(),
            features: vec![],
            icon: None,
        }
    }

    fn catalog() -> PlanCatalog {
        PlanCatalog::new(Arc::new(InMemoryPlanRepository::default()))
    }

    #[tokio::test]
    async fn create_update_delete() {
        let catalog = catalog();
        let plan = catalog.create(draft("Basic", 100)).await.unwrap();
        catalog.create(draft("Premium", 5000)).await.unwrap();

        let listed = catalog.list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "Basic");

        let updated = catalog.update(plan.id, draft("Basic Plus", 150)).await.unwrap();
        assert_eq!(updated.id, plan.id);
        assert_eq!(catalog.get(plan.id).await.unwrap().name, "Basic Plus");

        catalog.delete(plan.id).await.unwrap();
        assert!(matches!(catalog.get(plan.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected() {
        let mut bad = draft("Broken", 10);
        bad.duration = "whenever".to_string();
        assert!(matches!(catalog().create(bad).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn updating_missing_plan_is_not_found() {
        let err = catalog().update(Uuid::new_v4(), draft("Ghost", 1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
