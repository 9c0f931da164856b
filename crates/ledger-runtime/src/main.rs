//! Ledger runtime binary.
//!
//! ```text
//! ledger-runtime < events.jsonl > responses.jsonl
//! ```

use anyhow::{Context, Result};
use ledger_runtime::{LedgerRuntime, RuntimeConfig};
use ledger_split::InvocationContext;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout carries responses
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = RuntimeConfig::from_env();
    let profiles = config.load_profiles().context("seeding profiles")?;

    info!(
        version = ledger_split::VERSION,
        mode = ?config.ledger.dispatch_mode,
        profiles = profiles.len(),
        "Ledger runtime starting"
    );

    let runtime = LedgerRuntime::new(config, profiles);

    // Ctrl+C cancels whatever is in flight
    let (cancel, ctx) = InvocationContext::cancellable();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            cancel.cancel();
        }
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let summary = runtime.replay(&ctx, stdin, &mut stdout).await?;

    info!(
        events = summary.events,
        failed = summary.failed,
        redeliver = summary.redeliver,
        interrupted = summary.interrupted,
        "Replay finished"
    );

    runtime.shutdown().await
}
