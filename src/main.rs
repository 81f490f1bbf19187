mod bootstrap;
mod chain;
mod config;
mod error;
mod ledger;
mod lifecycle;
mod scheduler;
#[cfg(test)]
mod testing;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::scheduler::ContestScheduler;

#[derive(Parser)]
#[command(name = "contest-engine")]
#[command(about = "Contest lifecycle reconciliation engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the periodic scheduler until Ctrl-C
    Run,

    /// Activate OPEN contests whose tournament has started
    Activate,

    /// Lock ACTIVE contests that reached the lock round
    Lock,

    /// Settle contests whose tournament is complete
    Settle,

    /// Claim the accumulated oracle fee of one contest
    ClaimFee {
        /// Contest id
        contest_id: String,
    },

    /// Compare one contest's ledger record with its contract (read only)
    Inspect {
        /// Contest id
        contest_id: String,
    },
}

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,contest_engine=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("loading configuration")?;
    let engine = bootstrap::initialize_engine(&config)
        .await
        .context("initializing engine")?;

    match cli.cmd {
        Commands::Run => {
            info!("🚀 Starting contest lifecycle scheduler");

            let engine = Arc::new(engine);
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let handle =
                ContestScheduler::new(engine, config.batch.scan_interval()).start(shutdown_rx);

            tokio::signal::ctrl_c().await?;
            info!("🛑 Shutting down scheduler, waiting for the current cycle");
            shutdown_tx.send(true).ok();
            handle.await?;
        }
        Commands::Activate => print_json(&engine.batch_activate_contests().await?)?,
        Commands::Lock => print_json(&engine.batch_lock_contests().await?)?,
        Commands::Settle => print_json(&engine.batch_settle_contests().await?)?,
        Commands::ClaimFee { contest_id } => print_json(&engine.claim_oracle_fee(&contest_id).await)?,
        Commands::Inspect { contest_id } => print_json(&engine.inspect_contest(&contest_id).await?)?,
    }

    Ok(())
}
