use alloy::primitives::{Address, TxHash};
use alloy::providers::DynProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use strategy_contracts::IBaseStrategy;

/// Calls made by the keeper on one strategy.
#[async_trait]
pub trait StrategyClient: Send + Sync {
    async fn is_paused(&self) -> Result<bool>;

    /// Submit `rebalanceAndReport()`. Resolves once the node accepted the
    /// transaction, without waiting for it to be mined.
    async fn rebalance_and_report(&self) -> Result<TxHash>;
}

/// `StrategyClient` over JSON-RPC, signing with the provider's wallet.
#[derive(Clone)]
pub struct RpcStrategyClient {
    strategy: IBaseStrategy::IBaseStrategyInstance<DynProvider>,
}

impl RpcStrategyClient {
    pub fn new(provider: DynProvider, strategy_address: Address) -> Self {
        Self {
            strategy: IBaseStrategy::new(strategy_address, provider),
        }
    }
}

#[async_trait]
impl StrategyClient for RpcStrategyClient {
    async fn is_paused(&self) -> Result<bool> {
        self.strategy
            .isPaused()
            .call()
            .await
            .context("Fetching paused flag failed")
    }

    async fn rebalance_and_report(&self) -> Result<TxHash> {
        let pending = self
            .strategy
            .rebalanceAndReport()
            .send()
            .await
            .context("Failed to send rebalanceAndReport transaction")?;

        Ok(*pending.tx_hash())
    }
}
