use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use csv::Writer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::record::TransactionRecord;
use crate::domain::{Transaction, TransactionStatus};
use crate::error::AppError;
use crate::validation::{validate_enum, EXPORT_FORMATS};
use crate::AppState;

/// Query parameters for the export endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct ExportQuery {
    /// Export format: "csv" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Only transactions created at or after this instant
    pub from: Option<DateTime<Utc>>,
    /// Only transactions created before this instant
    pub to: Option<DateTime<Utc>>,
    pub status: Option<String>,
}

fn default_format() -> String {
    "csv".to_string()
}

/// Flat CSV row. Payload fields that do not apply to the type are left blank.
#[derive(Serialize)]
struct TransactionCsvRow {
    id: String,
    #[serde(rename = "type")]
    transaction_type: String,
    status: String,
    amount: String,
    date: String,
    plan: String,
    duration: String,
    interest: String,
    address: String,
    network: String,
    coin_name: String,
    related_id: String,
}

impl From<&Transaction> for TransactionCsvRow {
    fn from(tx: &Transaction) -> Self {
        let plan = tx.plan_data();
        let wallet = tx.wallet_data();
        TransactionCsvRow {
            id: tx.id().to_string(),
            transaction_type: tx.transaction_type().to_string(),
            status: tx.status().to_string(),
            amount: tx.amount().to_string(),
            date: tx.created_at().to_rfc3339(),
            plan: plan.map(|p| p.plan.clone()).unwrap_or_default(),
            duration: plan.map(|p| p.duration.clone()).unwrap_or_default(),
            interest: plan.map(|p| p.interest.to_string()).unwrap_or_default(),
            address: wallet.map(|w| w.address.clone()).unwrap_or_default(),
            network: wallet.map(|w| w.network.clone()).unwrap_or_default(),
            coin_name: wallet.map(|w| w.coin_name.clone()).unwrap_or_default(),
            related_id: tx.related_id().map(|id| id.to_string()).unwrap_or_default(),
        }
    }
}

fn filter_history(history: Vec<Transaction>, query: &ExportQuery) -> Result<Vec<Transaction>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(|s| s.parse::<TransactionStatus>().map_err(AppError::BadRequest))
        .transpose()?;

    Ok(history
        .into_iter()
        .filter(|tx| query.from.map_or(true, |from| tx.created_at() >= from))
        .filter(|tx| query.to.map_or(true, |to| tx.created_at() < to))
        .filter(|tx| status.map_or(true, |s| tx.status() == s))
        .collect())
}

fn to_csv(history: &[Transaction]) -> Result<String, AppError> {
    let mut writer = Writer::from_writer(Vec::new());
    for tx in history {
        writer
            .serialize(TransactionCsvRow::from(tx))
            .map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(e.to_string()))
}

fn to_json(history: &[Transaction]) -> Result<String, AppError> {
    let records: Vec<TransactionRecord> = history.iter().map(TransactionRecord::from).collect();
    serde_json::to_string(&records).map_err(|e| AppError::Internal(e.to_string()))
}

pub async fn export_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let format = query.format.trim().to_lowercase();
    validate_enum("format", &format, EXPORT_FORMATS)?;

    let history = filter_history(state.dashboard.history(user_id).await?, &query)?;
    let (body, content_type) = match format.as_str() {
        "json" => (to_json(&history)?, "application/json"),
        _ => (to_csv(&history)?, "text/csv"),
    };

    tracing::info!(user_id = %user_id, format = %format, rows = history.len(), "Transaction history exported");

    let filename = format!("transactions-{}.{}", user_id, format);
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
            .map_err(|e| AppError::Internal(e.to_string()))?,
    );

    Ok((StatusCode::OK, headers, body))
}
