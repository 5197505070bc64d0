//! Investment plan templates managed by admins.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::PlanData;
use crate::utils::time::{parse_duration_days, InvalidDuration};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    pub id: Uuid,
    pub name: String,
    /// Percent returned over the full duration.
    pub roi: BigDecimal,
    pub min_amount: BigDecimal,
    pub duration: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Admin-supplied fields for creating or replacing a plan.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDraft {
    pub name: String,
    pub roi: BigDecimal,
    pub min_amount: BigDecimal,
    pub duration: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl InvestmentPlan {
    pub fn from_draft(id: Uuid, draft: PlanDraft) -> Self {
        Self {
            id,
            name: draft.name,
            roi: draft.roi,
            min_amount: draft.min_amount,
            duration: draft.duration,
            features: draft.features,
            icon: draft.icon,
        }
    }

    pub fn term_days(&self) -> Result<u32, InvalidDuration> {
        parse_duration_days(&self.duration)
    }

    /// Full-term interest on `amount`, rounded to cents.
    pub fn full_term_interest(&self, amount: &BigDecimal) -> BigDecimal {
        (amount * &self.roi / BigDecimal::from(100)).round(2)
    }

    /// Terms frozen onto an investment of `amount`. Later edits to the plan do not
    /// reach investments already holding a snapshot.
    pub fn snapshot(&self, amount: &BigDecimal) -> PlanData {
        PlanData {
            plan: self.name.clone(),
            duration: self.duration.clone(),
            interest: self.full_term_interest(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold() -> InvestmentPlan {
        InvestmentPlan::from_draft(
            Uuid::new_v4(),
            PlanDraft {
                name: "Gold".to_string(),
                roi: "12.5".parse().unwrap(),
                min_amount: BigDecimal::from(500),
                duration: "3 months".to_string(),
                features: vec!["Priority support".to_string()],
                icon: None,
            },
        )
    }

    #[test]
    fn computes_full_term_interest() {
        let plan = gold();
        assert_eq!(plan.full_term_interest(&BigDecimal::from(1000)), BigDecimal::from(125));
        assert_eq!(
            plan.full_term_interest(&"333.33".parse().unwrap()),
            "41.67".parse::<BigDecimal>().unwrap()
        );
    }

    #[test]
    fn snapshot_copies_terms() {
        let plan = gold();
        let terms = plan.snapshot(&BigDecimal::from(2000));
        assert_eq!(terms.plan, "Gold");
        assert_eq!(terms.duration, "3 months");
        assert_eq!(terms.interest, BigDecimal::from(250));
        assert_eq!(plan.term_days(), Ok(90));
    }
}
