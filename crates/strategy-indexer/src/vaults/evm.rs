use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::{Filter, Log};
use anyhow::Context;
use chrono::{DateTime, Utc};
use strategy_contracts::hex_address;
use task_supervisor::{SupervisedTask, TaskError};

use crate::config::IndexerConfig;
use crate::events::{ContractEvent, EventMeta};
use crate::projector::{EventProjector, Store};
use crate::vaults::state::VaultState;

/// `(block_number, log_index)`
type LogPosition = (u64, u64);

/// Tracked strategies and the position of the log that registered them.
/// Their earlier logs are never projected.
type TrackedStrategies = BTreeMap<Address, LogPosition>;

/// Polls the logs of one vault and of the strategies attached to it, and
/// feeds them to the projector in chain order.
#[derive(Clone)]
pub struct EvmIndexer {
    pub vault_address: Address,
    pub provider: DynProvider,
    pub projector: Arc<EventProjector>,
    pub store: Arc<dyn Store>,
    pub config: IndexerConfig,
    pub state: VaultState,
}

#[async_trait::async_trait]
impl SupervisedTask for EvmIndexer {
    async fn run(&mut self) -> Result<(), TaskError> {
        self.state.load().await?;
        let mut tracked = self.load_tracked_strategies().await?;

        tracing::info!(
            "[EvmIndexer] 🔌 Indexing Vault({}) and {} strategies from block {}",
            self.state.vault_address,
            tracked.len(),
            self.state.current_block
        );

        let mut synced = false;
        loop {
            let head = self
                .provider
                .get_block_number()
                .await
                .context("Failed to fetch the chain head")?;

            let Some((from_block, to_block)) =
                next_range(self.state.current_block, head, self.config.block_chunk_size)
            else {
                if !synced {
                    self.state.set_synced().await?;
                    synced = true;
                    tracing::info!(
                        "[EvmIndexer] 🥳 Vault({}) reached the tip of the chain at block {head}!",
                        self.state.vault_address
                    );
                }
                tokio::time::sleep(self.config.poll_interval).await;
                continue;
            };

            match self.index_range(from_block, to_block, &mut tracked).await {
                Ok(to_timestamp) => {
                    self.state.advance(to_block, Some(to_timestamp)).await?;
                    tracing::debug!(
                        "[EvmIndexer] 📦 Vault({}) processed blocks {from_block}..={to_block}",
                        self.state.vault_address
                    );
                }
                Err(e) => {
                    self.state.record_error(e.to_string()).await?;
                    return Err(e);
                }
            }
        }
    }
}

/// Next block range to fetch, `None` once `current_block` is past the head.
fn next_range(current_block: u64, head: u64, chunk_size: u64) -> Option<(u64, u64)> {
    if current_block > head {
        return None;
    }
    let last = current_block.saturating_add(chunk_size.max(1) - 1);
    Some((current_block, head.min(last)))
}

impl EvmIndexer {
    async fn load_tracked_strategies(&self) -> Result<TrackedStrategies, anyhow::Error> {
        let infos = self
            .store
            .strategies_of_vault(&hex_address(self.vault_address))
            .await?;

        Ok(infos
            .iter()
            .filter_map(|info| match info.id.parse::<Address>() {
                // Rows without a position predate it: keep all their logs.
                Ok(address) => Some((address, info.tracked_from().unwrap_or_default())),
                Err(e) => {
                    tracing::warn!("[EvmIndexer] ⚠️ Ignoring stored strategy {}: {e}", info.id);
                    None
                }
            })
            .collect())
    }

    /// Project every log of `from_block..=to_block`. Returns the timestamp
    /// of `to_block`.
    async fn index_range(
        &self,
        from_block: u64,
        to_block: u64,
        tracked: &mut TrackedStrategies,
    ) -> Result<DateTime<Utc>, anyhow::Error> {
        let mut addresses = vec![self.vault_address];
        addresses.extend(tracked.keys().copied());

        let mut pending = self.fetch_logs(addresses, from_block, to_block).await?;
        pending.retain(|position, log| {
            tracked
                .get(&log.address())
                .is_none_or(|registered_at| position > registered_at)
        });
        let mut timestamps: HashMap<u64, DateTime<Utc>> = HashMap::new();

        while let Some(((block_number, log_index), log)) = pending.pop_first() {
            let event = match ContractEvent::decode(&log.inner, self.vault_address) {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        "[EvmIndexer] ⚠️ Undecodable log {block_number}:{log_index} from {}: {e}",
                        log.address()
                    );
                    continue;
                }
            };

            let block_timestamp = self
                .block_timestamp(block_number, log.block_timestamp, &mut timestamps)
                .await?;

            let meta = EventMeta {
                address: log.address(),
                block_number,
                block_timestamp,
                transaction_hash: log
                    .transaction_hash
                    .context("Log without transaction hash")?,
                log_index,
            };

            self.projector.project(&meta, &event).await?;

            let Some(strategy) = event.registered_strategy() else {
                continue;
            };
            if tracked.contains_key(&strategy) {
                continue;
            }
            tracked.insert(strategy, (block_number, log_index));
            tracing::info!(
                "[EvmIndexer] 🛰️ Vault({}) now tracks strategy {}",
                self.state.vault_address,
                hex_address(strategy)
            );

            // Logs of the new strategy later in this chunk
            let later = self
                .fetch_logs(vec![strategy], block_number, to_block)
                .await?
                .into_iter()
                .filter(|(position, _)| *position > (block_number, log_index));
            pending.extend(later);
        }

        self.block_timestamp(to_block, None, &mut timestamps).await
    }

    async fn fetch_logs(
        &self,
        addresses: Vec<Address>,
        from_block: u64,
        to_block: u64,
    ) -> Result<BTreeMap<LogPosition, Log>, anyhow::Error> {
        let filter = Filter::new()
            .address(addresses)
            .from_block(from_block)
            .to_block(to_block);

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .with_context(|| format!("Failed to fetch logs of blocks {from_block}..={to_block}"))?;

        logs.into_iter()
            .filter(|log| !log.removed)
            .map(|log| {
                let block_number = log.block_number.context("Log without block number")?;
                let log_index = log.log_index.context("Log without log index")?;
                Ok(((block_number, log_index), log))
            })
            .collect()
    }

    /// Timestamp of `block_number`, from the cache, the log itself, or the
    /// block header, in that order.
    async fn block_timestamp(
        &self,
        block_number: u64,
        from_log: Option<u64>,
        cache: &mut HashMap<u64, DateTime<Utc>>,
    ) -> Result<DateTime<Utc>, anyhow::Error> {
        if let Some(timestamp) = cache.get(&block_number) {
            return Ok(*timestamp);
        }

        let seconds = match from_log {
            Some(seconds) => seconds,
            None => {
                self.provider
                    .get_block_by_number(BlockNumberOrTag::Number(block_number))
                    .await?
                    .with_context(|| format!("Block {block_number} not found"))?
                    .header
                    .timestamp
            }
        };

        let timestamp = DateTime::from_timestamp(i64::try_from(seconds)?, 0)
            .with_context(|| format!("Invalid timestamp {seconds} for block {block_number}"))?;
        cache.insert(block_number, timestamp);
        Ok(timestamp)
    }
}
