pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod ports;
pub mod seed;
pub mod services;
pub mod use_cases;
pub mod utils;
pub mod validation;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::ports::{PlanRepository, TransactionRepository, UserRepository};
use crate::services::{AdjudicationService, DashboardService, PlanCatalog};

#[derive(Clone)]
pub struct AppState {
    pub transactions: Arc<dyn TransactionRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub adjudication: AdjudicationService,
    pub catalog: PlanCatalog,
    pub dashboard: DashboardService,
    pub currency_symbol: String,
}

impl AppState {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        plans: Arc<dyn PlanRepository>,
        users: Arc<dyn UserRepository>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            adjudication: AdjudicationService::new(transactions.clone(), users.clone()),
            catalog: PlanCatalog::new(plans.clone()),
            dashboard: DashboardService::new(transactions.clone(), users),
            transactions,
            plans,
            currency_symbol: currency_symbol.into(),
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/users/:user_id/balances", get(handlers::dashboard::get_balances))
        .route("/users/:user_id/transactions", get(handlers::dashboard::list_transactions))
        .route(
            "/users/:user_id/transactions/export",
            get(handlers::export::export_transactions),
        )
        .route("/users/:user_id/deposits", post(handlers::requests::create_deposit))
        .route("/users/:user_id/withdrawals", post(handlers::requests::create_withdrawal))
        .route("/users/:user_id/investments", post(handlers::requests::create_investment))
        .route("/admin/transactions/:id", get(handlers::admin::get_transaction))
        .route("/admin/transactions/:id/approve", post(handlers::admin::approve_transaction))
        .route("/admin/transactions/:id/reject", post(handlers::admin::reject_transaction))
        .route("/admin/transactions/:id/complete", post(handlers::admin::complete_transaction))
        .route("/admin/transactions/:id/cancel", post(handlers::admin::cancel_transaction))
        .route(
            "/admin/plans",
            get(handlers::admin::list_plans).post(handlers::admin::create_plan),
        )
        .route(
            "/admin/plans/:id",
            put(handlers::admin::update_plan).delete(handlers::admin::delete_plan),
        )
        .with_state(state)
}
