//! # Ledger Runtime Binary
//!
//! Loads `CL_*` configuration, wires the complaint ledger, runs its
//! background loops and shuts down gracefully on Ctrl+C.
//!
//! Log filtering follows `CL_LOG`, then `RUST_LOG`, defaulting to `info`.

use anyhow::{Context, Result};
use ledger_runtime::{ComplaintLedger, LedgerConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn env_filter() -> EnvFilter {
    std::env::var("CL_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = LedgerConfig::from_env().context("loading configuration")?;
    let ledger = ComplaintLedger::from_config(config).context("wiring complaint ledger")?;

    ledger.start();
    info!(
        started_at = %chrono::Utc::now().to_rfc3339(),
        "Complaint ledger is running. Press Ctrl+C to stop."
    );
    tokio::signal::ctrl_c().await?;

    ledger.shutdown().await;
    Ok(())
}
