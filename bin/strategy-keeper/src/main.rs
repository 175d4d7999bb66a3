use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use strategy_contracts::signer_provider;
use strategy_keeper::config::DEFAULT_STRATEGY_ADDRESS;
use strategy_keeper::{KeeperConfig, KeeperService, RpcStrategyClient};
use strategy_metrics::MetricsRegistry;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "Strategy rebalance and report keeper", long_about = None)]
struct Cli {
    #[arg(long, env = "RPC_URL")]
    rpc_url: Url,

    #[arg(long, env = "KEEPER_PRIVATE_KEY", hide_env_values = true)]
    private_key: String,

    #[arg(long, env = "STRATEGY_ADDRESS", default_value_t = DEFAULT_STRATEGY_ADDRESS)]
    strategy_address: Address,

    /// Seconds between attempts. Without it a single attempt is made and its
    /// outcome printed as JSON.
    #[arg(long, env = "KEEPER_INTERVAL_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    interval_secs: Option<u64>,
}

fn init_logger() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_logger();

    let cli = Cli::parse();

    let (provider, signer) = signer_provider(cli.rpc_url, &cli.private_key)?;
    tracing::info!(signer = %signer, strategy = %cli.strategy_address, "Keeper ready");

    let client = Arc::new(RpcStrategyClient::new(provider, cli.strategy_address));
    let mut config = KeeperConfig {
        strategy_address: cli.strategy_address,
        ..KeeperConfig::default()
    };

    let Some(interval_secs) = cli.interval_secs else {
        let service = KeeperService::new(client, config, MetricsRegistry::new().keeper.clone());
        let outcome = service.run_once().await;
        println!(
            "{}",
            serde_json::to_string(&outcome).context("Failed to serialize outcome")?
        );
        return Ok(());
    };

    config.interval = Duration::from_secs(interval_secs);
    let service = KeeperService::new(client, config, MetricsRegistry::new().keeper.clone());

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    service.run_forever(shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
        let mut args = vec![
            "strategy-keeper",
            "--rpc-url",
            "http://localhost:8545",
            "--private-key",
            "0x01",
        ];
        args.extend_from_slice(extra);
        Cli::try_parse_from(args)
    }

    #[test]
    fn test_interval_defaults_to_single_attempt() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.interval_secs, None);
        assert_eq!(cli.strategy_address, DEFAULT_STRATEGY_ADDRESS);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = parse(&["--interval-secs", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        assert_eq!(parse(&["--interval-secs", "60"]).unwrap().interval_secs, Some(60));
    }
}
