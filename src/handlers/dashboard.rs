use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::record::TransactionRecord;
use crate::error::AppError;
use crate::services::{Balances, DashboardSnapshot, FormattedBalances};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BalancesQuery {
    /// Evaluate at this instant instead of the current time.
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    pub user_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub balances: Balances,
    pub formatted: FormattedBalances,
    pub live_interest: BTreeMap<Uuid, BigDecimal>,
    pub active_investments: usize,
    pub skipped: Vec<Uuid>,
}

impl BalancesResponse {
    fn from_snapshot(snapshot: DashboardSnapshot, currency_symbol: &str) -> Self {
        Self {
            user_id: snapshot.user_id,
            as_of: snapshot.as_of,
            formatted: snapshot.balances.formatted(currency_symbol),
            balances: snapshot.balances,
            live_interest: snapshot.active_interest.per_investment,
            active_investments: snapshot.active_interest.active_count,
            skipped: snapshot.active_interest.skipped,
        }
    }
}

pub async fn get_balances(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<BalancesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let now = query.at.unwrap_or_else(Utc::now);
    let snapshot = state.dashboard.snapshot(user_id, now).await?;

    Ok(Json(BalancesResponse::from_snapshot(snapshot, &state.currency_symbol)))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let history = state.dashboard.history(user_id).await?;
    let records: Vec<TransactionRecord> = history.iter().map(TransactionRecord::from).collect();

    Ok(Json(records))
}
