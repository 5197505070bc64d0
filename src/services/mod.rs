pub mod accrual;
pub mod adjudication;
pub mod admin;
pub mod balances;
pub mod dashboard;
pub mod plans;

pub use accrual::{live_interest, total_active_interest, ActiveInterest};
pub use adjudication::{approve, cancel, complete, reject, Adjudicated, Cancellation, Completion, Rejection};
pub use admin::{AdjudicationService, AdminAction};
pub use balances::{compute_balances, Balances, FormattedBalances};
pub use dashboard::{DashboardService, DashboardSnapshot};
pub use plans::PlanCatalog;
