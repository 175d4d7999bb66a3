//! Keeper triggering the periodic rebalance and report of a strategy.

pub mod client;
pub mod config;
pub mod outcome;
pub mod service;

pub use client::{RpcStrategyClient, StrategyClient};
pub use config::KeeperConfig;
pub use outcome::{KeeperOutcome, KeeperStatus};
pub use service::KeeperService;
