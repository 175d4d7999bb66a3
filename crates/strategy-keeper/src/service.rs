use std::sync::Arc;

use anyhow::Result;
use strategy_contracts::hex_address;
use strategy_metrics::KeeperMetrics;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::client::StrategyClient;
use crate::config::KeeperConfig;
use crate::outcome::KeeperOutcome;

pub struct KeeperService {
    client: Arc<dyn StrategyClient>,
    config: KeeperConfig,
    metrics: Arc<KeeperMetrics>,
}

impl KeeperService {
    pub fn new(
        client: Arc<dyn StrategyClient>,
        config: KeeperConfig,
        metrics: Arc<KeeperMetrics>,
    ) -> Self {
        Self {
            client,
            config,
            metrics,
        }
    }

    /// One attempt: skip a paused strategy, otherwise submit
    /// `rebalanceAndReport()`. Failures become an `error` outcome and are
    /// never retried here.
    pub async fn run_once(&self) -> KeeperOutcome {
        let strategy = hex_address(self.config.strategy_address);

        let outcome = match self.client.is_paused().await {
            Ok(true) => {
                info!(strategy = %strategy, "Strategy is paused, skip");
                KeeperOutcome::skipped()
            }
            Ok(false) => match self.client.rebalance_and_report().await {
                Ok(tx_hash) => {
                    info!(strategy = %strategy, tx_hash = %tx_hash, "rebalanceAndReport submitted");
                    KeeperOutcome::success()
                }
                Err(err) => {
                    error!(strategy = %strategy, ?err, "rebalanceAndReport failed");
                    KeeperOutcome::error()
                }
            },
            Err(err) => {
                error!(strategy = %strategy, ?err, "Reading paused flag failed");
                KeeperOutcome::error()
            }
        };

        self.metrics
            .record_outcome(&strategy, outcome.status.as_ref());
        outcome
    }

    /// Run an attempt every `interval` until `shutdown` fires.
    pub async fn run_forever(&self, shutdown: CancellationToken) -> Result<()> {
        loop {
            if shutdown.is_cancelled() {
                info!("Keeper shutdown requested");
                break;
            }

            let outcome = self.run_once().await;
            info!(
                status = %outcome.status,
                reason = %outcome.reason,
                "Keeper attempt finished"
            );

            let shutdown_fut = shutdown.clone();
            tokio::select! {
                () = shutdown_fut.cancelled() => break,
                () = sleep(self.config.interval) => {}
            }
        }

        Ok(())
    }
}
