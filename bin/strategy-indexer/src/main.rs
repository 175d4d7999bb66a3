mod cli;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use strategy_contracts::read_only_provider;
use strategy_db::{init_pool, run_migrations};
use strategy_indexer::{IndexerConfig, IndexerService};
use strategy_metrics::MetricsRegistry;
use tracing_subscriber::EnvFilter;

use crate::cli::IndexerCli;

fn init_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logger();

    let IndexerCli {
        database_url,
        rpc_url,
        vault_addresses,
        start_block,
        block_chunk_size,
        poll_interval_secs,
    } = IndexerCli::parse();

    let app_name = "strategy_indexer";
    let pool = init_pool(app_name, &database_url)?;
    run_migrations(&pool).await?;

    let config = IndexerConfig {
        poll_interval: Duration::from_secs(poll_interval_secs),
        block_chunk_size,
    };

    let indexer_service = IndexerService::new(
        pool,
        read_only_provider(rpc_url),
        vault_addresses,
        start_block,
        config,
        MetricsRegistry::new().indexer.clone(),
    );

    tokio::select! {
        res = indexer_service.run_forever() => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("[{app_name}] 👋 Shutting down");
            Ok(())
        }
    }
}
