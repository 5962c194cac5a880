//! Ledger reconciler.
//!
//! Usage:
//!   reconciler check                 - Report accounts whose balances drifted
//!   reconciler repair                - Replay every account and rewrite balances
//!   reconciler repair --account <ID> - Replay a single account
//!
//! Configuration comes from `config/` and `LEDGERLINE__*` variables, like the
//! rest of Ledgerline. `RUST_LOG` overrides the configured log filter.

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use ledgerline_core::ledger::{LedgerService, LedgerSettings};
use ledgerline_db::{AccountRepository, SeaOrmLedgerStore, connect_with};
use ledgerline_shared::AppConfig;
use ledgerline_shared::config::LoggingConfig;
use ledgerline_shared::types::AccountId;

#[derive(Debug, Parser)]
#[command(name = "reconciler", version, about = "Replays account ledgers and repairs running balances")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only process this account
    #[arg(long, global = true)]
    account: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Compare stored balances with a replay, writing nothing
    Check,
    /// Replay ledgers and rewrite every running balance
    Repair,
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.filter.as_str().into());

    tracing_subscriber::registry()
        .with(filter)
        .with(logging.json.then(|| fmt::layer().json()))
        .with((!logging.json).then(fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    let settings = LedgerSettings::from_config(&config.ledger)?;
    let service = LedgerService::new(Arc::new(SeaOrmLedgerStore::new(db.clone())), settings);

    let accounts = match cli.account {
        Some(id) => vec![AccountId::from_uuid(id)],
        None => AccountRepository::new(db).list_ids().await?,
    };
    info!(accounts = accounts.len(), command = ?cli.command, "Starting reconciliation");

    let failed = match cli.command {
        Command::Check => check(&service, &accounts).await,
        Command::Repair => repair(&service, &accounts).await,
    };

    if failed > 0 {
        bail!("{failed} of {} accounts did not reconcile", accounts.len());
    }
    info!("All accounts reconciled");
    Ok(())
}

async fn check(service: &LedgerService<SeaOrmLedgerStore>, accounts: &[AccountId]) -> usize {
    let mut failed = 0;
    for &account_id in accounts {
        match service.audit_account(account_id).await {
            Ok(drift) if drift.is_consistent() => {
                info!(%account_id, rows = drift.total_rows, balance = %drift.stored_balance, "Consistent");
            }
            Ok(drift) => {
                failed += 1;
                warn!(
                    %account_id,
                    mismatched_rows = drift.mismatched_rows,
                    total_rows = drift.total_rows,
                    stored_balance = %drift.stored_balance,
                    expected_balance = %drift.expected_balance,
                    "Balance drift detected"
                );
            }
            Err(e) => {
                failed += 1;
                error!(%account_id, error = %e, code = e.error_code(), "Audit failed");
            }
        }
    }
    failed
}

async fn repair(service: &LedgerService<SeaOrmLedgerStore>, accounts: &[AccountId]) -> usize {
    let mut failed = 0;
    for &account_id in accounts {
        match service.recalculate_account(account_id).await {
            Ok(report) => {
                info!(
                    %account_id,
                    rows = report.transactions_updated,
                    previous_balance = %report.previous_balance,
                    final_balance = %report.final_balance,
                    "Recalculated"
                );
            }
            Err(e) => {
                failed += 1;
                error!(
                    %account_id,
                    error = %e,
                    code = e.error_code(),
                    retryable = e.is_retryable(),
                    "Recalculation failed"
                );
            }
        }
    }
    failed
}
