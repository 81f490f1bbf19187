use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

use crate::{
    chain::{evm, ChainRegistry, OracleVerifier},
    config::Config,
    error::AppResult,
    ledger::PgContestLedger,
    lifecycle::LifecycleEngine,
};

pub async fn initialize_engine(config: &Config) -> AppResult<LifecycleEngine> {
    info!("Initializing contest lifecycle engine ...");

    let pool = initialize_database(&config.database_url).await?;
    let ledger = Arc::new(PgContestLedger::new(pool));

    info!("⚙️  Initializing chain clients...");

    if config.oracle_private_key.is_none() {
        error!("⚠️  ORACLE_PRIVATE_KEY not set - every transition will be refused");
    }
    if config.oracle_address.is_none() {
        error!("⚠️  ORACLE_ADDRESS not set - every transition will be refused");
    }

    let mut registry = ChainRegistry::new();
    for network in &config.networks {
        // An unreachable endpoint only costs that network's contests this round
        if let Err(e) = evm::verify_endpoint(network).await {
            warn!("⚠️  {} endpoint check failed: {}", network.name, e);
        }

        let client = evm::connect(network, config.oracle_private_key.as_deref())?;
        registry.register(client);
    }
    let registry = Arc::new(registry);

    info!(
        "🔗 Chain registry initialized with chains: {:?}",
        registry.registered_chains()
    );

    let verifier = OracleVerifier::new(registry.clone(), config.expected_oracles()?);

    Ok(LifecycleEngine::new(
        ledger,
        registry,
        verifier,
        config.supported_chain_ids(),
        &config.batch,
    ))
}

async fn initialize_database(database_url: &str) -> AppResult<PgPool> {
    info!("📊 Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .connect(database_url)
        .await?;

    info!("🔄 Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("✓ Database initialized");
    Ok(pool)
}
