use std::time::Duration;

use alloy::primitives::{Address, address};

/// Deployed Compound USDC strategy
pub const DEFAULT_STRATEGY_ADDRESS: Address =
    address!("0x341A2c85C499895331fa2977EB1908939676cE83");

/// Configuration for keeper runtime behaviour.
#[derive(Debug, Clone)]
pub struct KeeperConfig {
    pub strategy_address: Address,
    /// Time between two attempts when running forever
    pub interval: Duration,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            strategy_address: DEFAULT_STRATEGY_ADDRESS,
            interval: Duration::from_secs(60 * 60),
        }
    }
}
