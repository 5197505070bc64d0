use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::record::TransactionRecord;
use crate::domain::PlanDraft;
use crate::error::AppError;
use crate::services::adjudication::AdjudicatedRecord;
use crate::services::AdminAction;
use crate::AppState;

pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

fn idempotency_key(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    match headers.get(IDEMPOTENCY_HEADER) {
        None => Ok(None),
        Some(value) => {
            let key = value
                .to_str()
                .map_err(|_| AppError::BadRequest(format!("{} must be visible ASCII", IDEMPOTENCY_HEADER)))?
                .trim();
            if key.is_empty() {
                return Err(AppError::BadRequest(format!("{} must not be empty", IDEMPOTENCY_HEADER)));
            }
            Ok(Some(key.to_string()))
        }
    }
}

async fn adjudicate(
    state: &AppState,
    id: Uuid,
    action: AdminAction,
    headers: &HeaderMap,
) -> Result<Json<AdjudicatedRecord>, AppError> {
    let key = idempotency_key(headers)?;
    let outcome = state
        .adjudication
        .adjudicate(id, action, Utc::now(), key.as_deref())
        .await?;
    Ok(Json(AdjudicatedRecord::from(&outcome)))
}

pub async fn approve_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    adjudicate(&state, id, AdminAction::Approve, &headers).await
}

pub async fn reject_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(payload): Json<RejectRequest>,
) -> Result<impl IntoResponse, AppError> {
    adjudicate(&state, id, AdminAction::Reject { reason: payload.reason }, &headers).await
}

pub async fn complete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    adjudicate(&state, id, AdminAction::Complete, &headers).await
}

pub async fn cancel_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    adjudicate(&state, id, AdminAction::Cancel, &headers).await
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = state.transactions.get_by_id(id).await?;
    Ok(Json(TransactionRecord::from(&tx)))
}

pub async fn list_plans(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.list().await?))
}

pub async fn create_plan(
    State(state): State<AppState>,
    Json(draft): Json<PlanDraft>,
) -> Result<impl IntoResponse, AppError> {
    let plan = state.catalog.create(draft).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<PlanDraft>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.update(id, draft).await?))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
