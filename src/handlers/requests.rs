use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::record::TransactionRecord;
use crate::domain::WalletData;
use crate::error::AppError;
use crate::use_cases::{FundsDirection, FundsInput, InvestmentInput, OpenInvestment, RequestFunds};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FundsRequest {
    pub amount: BigDecimal,
    pub address: String,
    pub network: String,
    pub coin_name: String,
    /// Amount in the wallet's coin. Zero when the client did not convert.
    #[serde(default)]
    pub converted_amount: Option<BigDecimal>,
}

#[derive(Debug, Deserialize)]
pub struct InvestmentRequest {
    pub plan_id: Uuid,
    pub amount: BigDecimal,
}

async fn request_funds(
    state: AppState,
    user_id: Uuid,
    direction: FundsDirection,
    payload: FundsRequest,
) -> Result<impl IntoResponse, AppError> {
    let input = FundsInput {
        user_id,
        direction,
        amount: payload.amount,
        wallet: WalletData {
            address: payload.address,
            network: payload.network,
            coin_name: payload.coin_name,
            converted_amount: payload.converted_amount.unwrap_or_else(BigDecimal::zero),
        },
    };
    let tx = RequestFunds::new(state.transactions.clone())
        .execute(input, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionRecord::from(&tx))))
}

pub async fn create_deposit(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<FundsRequest>,
) -> Result<impl IntoResponse, AppError> {
    request_funds(state, user_id, FundsDirection::Deposit, payload).await
}

pub async fn create_withdrawal(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<FundsRequest>,
) -> Result<impl IntoResponse, AppError> {
    request_funds(state, user_id, FundsDirection::Withdrawal, payload).await
}

pub async fn create_investment(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<InvestmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let tx = OpenInvestment::new(state.transactions.clone(), state.plans.clone())
        .execute(
            InvestmentInput {
                user_id,
                plan_id: payload.plan_id,
                amount: payload.amount,
            },
            Utc::now(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TransactionRecord::from(&tx))))
}
