use alloy::eips::BlockId;
use alloy::primitives::{Address, U256};
use alloy::providers::DynProvider;
use strategy_contracts::IBaseStrategy;

use crate::projector::ChainReader;

/// Reads strategy state over JSON-RPC at the block of the event being
/// projected.
#[derive(Clone)]
pub struct RpcChainReader {
    provider: DynProvider,
}

impl RpcChainReader {
    pub const fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl ChainReader for RpcChainReader {
    async fn strategy_name(&self, strategy: Address, block: u64) -> Option<String> {
        let contract = IBaseStrategy::new(strategy, self.provider.clone());
        match contract.name().block(BlockId::number(block)).call().await {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!(strategy = %strategy, block, error = %e, "name() call failed");
                None
            }
        }
    }

    async fn last_total_assets(&self, strategy: Address, block: u64) -> Option<U256> {
        let contract = IBaseStrategy::new(strategy, self.provider.clone());
        match contract
            .lastTotalAssets()
            .block(BlockId::number(block))
            .call()
            .await
        {
            Ok(total_assets) => Some(total_assets),
            Err(e) => {
                tracing::debug!(
                    strategy = %strategy,
                    block,
                    error = %e,
                    "lastTotalAssets() call failed"
                );
                None
            }
        }
    }
}
