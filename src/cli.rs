use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::record::{partition_records, TransactionRecord};
use crate::domain::UserSnapshot;
use crate::services::{compute_balances, total_active_interest, ActiveInterest, Balances, FormattedBalances};

#[derive(Parser)]
#[command(name = "invest-core")]
#[command(about = "Investment ledger: transaction lifecycle, interest accrual and balances", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Configuration validation
    Config,

    /// Evaluate a user's balances offline from a JSON snapshot
    Balances {
        /// Snapshot file: { "user": { "deposit", "interest" }, "transactions": [...] }
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// User whose ledger is evaluated
        #[arg(short, long, value_name = "USER_ID")]
        user: Uuid,

        /// Evaluation instant (RFC 3339); defaults to now
        #[arg(long, value_name = "TIMESTAMP")]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Debug, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub user: UserSnapshot,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotReport {
    pub user_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub balances: Balances,
    pub formatted: FormattedBalances,
    pub active_interest: ActiveInterest,
    pub rejected_records: Vec<Uuid>,
}

/// Evaluates one snapshot against one instant, the same way the dashboard does.
pub fn evaluate_snapshot(
    snapshot: LedgerSnapshot,
    user_id: Uuid,
    now: DateTime<Utc>,
    currency_symbol: &str,
) -> anyhow::Result<SnapshotReport> {
    let (transactions, rejected) = partition_records(snapshot.transactions);
    let active_interest = total_active_interest(user_id, &transactions, now);
    let balances = compute_balances(&snapshot.user, &active_interest.total)?;

    Ok(SnapshotReport {
        user_id,
        as_of: now,
        formatted: balances.formatted(currency_symbol),
        balances,
        active_interest,
        rejected_records: rejected.into_iter().map(|r| r.id).collect(),
    })
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<LedgerSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid snapshot {}", path.display()))
}

pub fn handle_balances(
    config: &Config,
    file: &Path,
    user_id: Uuid,
    at: Option<DateTime<Utc>>,
) -> anyhow::Result<()> {
    let now = at.unwrap_or_else(Utc::now);
    let report = evaluate_snapshot(load_snapshot(file)?, user_id, now, &config.currency_symbol)?;

    tracing::info!(
        user_id = %user_id,
        active = report.active_interest.active_count,
        rejected = report.rejected_records.len(),
        "Snapshot evaluated"
    );

    println!("Balances for {} at {}:", user_id, now.to_rfc3339());
    println!("  Wallet:  {}", report.formatted.wallet_balance);
    println!("  Capital: {}", report.formatted.capital_balance);
    println!("  Profit:  {}", report.formatted.profit_balance);
    println!("  Active investments: {}", report.active_interest.active_count);
    if !report.rejected_records.is_empty() {
        println!("  Skipped malformed records: {}", report.rejected_records.len());
    }

    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Currency Symbol: {}", config.currency_symbol);
    println!(
        "  CORS Allowed Origins: {}",
        if config.cors_allowed_origins.is_empty() {
            "(disabled)".to_string()
        } else {
            config.cors_allowed_origins.join(", ")
        }
    );
    println!(
        "  Seed File: {}",
        config
            .seed_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("  Log Format: {:?}", config.log_format);

    config.cors_layer()?;
    if let Some(path) = &config.seed_file {
        crate::seed::SeedFile::from_path(path)?;
    }

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}
