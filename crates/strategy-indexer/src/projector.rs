//! Projects decoded events into event records and the strategy meta info
//! side table.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use strategy_contracts::IBaseStrategy::IBaseStrategyEvents;
use strategy_contracts::IVault::IVaultEvents;
use strategy_contracts::{hex_address, u256_to_decimal};
use strategy_db::DatabaseError;
use strategy_db::models::{NewEventRecord, StrategyMetaInfo};
use strategy_metrics::IndexerMetrics;

use crate::events::{ContractEvent, EventMeta};

/// Persistence used by the projector.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Write an event record once. Returns `false` when a record with the
    /// same id already exists.
    async fn save_event(&self, record: NewEventRecord) -> Result<bool, DatabaseError>;

    async fn load_meta_info(&self, strategy: &str)
    -> Result<Option<StrategyMetaInfo>, DatabaseError>;

    async fn save_meta_info(&self, info: StrategyMetaInfo) -> Result<(), DatabaseError>;

    /// Meta info of the strategies attached to `vault`.
    async fn strategies_of_vault(
        &self,
        vault: &str,
    ) -> Result<Vec<StrategyMetaInfo>, DatabaseError>;
}

/// Best-effort reads of live strategy state. `None` means the read failed
/// and the field must be left as is.
#[async_trait::async_trait]
pub trait ChainReader: Send + Sync {
    async fn strategy_name(&self, strategy: Address, block: u64) -> Option<String>;

    async fn last_total_assets(&self, strategy: Address, block: u64) -> Option<U256>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectorError {
    #[error("store error: {0}")]
    Store(#[from] DatabaseError),
}

pub struct EventProjector {
    store: Arc<dyn Store>,
    chain: Arc<dyn ChainReader>,
    metrics: Arc<IndexerMetrics>,
}

impl EventProjector {
    pub fn new(
        store: Arc<dyn Store>,
        chain: Arc<dyn ChainReader>,
        metrics: Arc<IndexerMetrics>,
    ) -> Self {
        Self {
            store,
            chain,
            metrics,
        }
    }

    /// Write the record of `event`, then apply its side effect on the
    /// strategy meta info table if it has one.
    pub async fn project(&self, meta: &EventMeta, event: &ContractEvent) -> Result<(), ProjectorError> {
        let record = event.to_record(meta);
        let kind = record.kind.clone();
        let contract = record.contract_address.clone();

        if self.store.save_event(record).await? {
            self.metrics.record_projected(&contract, &kind);
        } else {
            tracing::debug!(
                "[EventProjector] ⏭️ {kind} {} already stored",
                meta.record_id()
            );
        }

        match event {
            ContractEvent::Vault(event) => self.apply_vault_event(meta, event).await,
            ContractEvent::Strategy(event) => self.apply_strategy_event(meta, event).await,
        }
    }

    async fn apply_vault_event(
        &self,
        meta: &EventMeta,
        event: &IVaultEvents,
    ) -> Result<(), ProjectorError> {
        match event {
            IVaultEvents::StrategyAdded(added) => {
                self.register(added.strategy, meta).await?;
            }
            IVaultEvents::StrategyMigrated(migrated) => {
                self.retire(migrated.oldVersion, meta.block_timestamp).await?;
                self.register(migrated.newVersion, meta).await?;
            }
            IVaultEvents::StrategyRemoved(removed) => {
                self.retire(removed.strategy, meta.block_timestamp).await?;
            }
            IVaultEvents::UpdateStrategySharePercent(update) => {
                self.set_share_percent(update.strategy, update.newPercent)
                    .await?;
            }
            _ => {}
        }

        Ok(())
    }

    async fn apply_strategy_event(
        &self,
        meta: &EventMeta,
        event: &IBaseStrategyEvents,
    ) -> Result<(), ProjectorError> {
        match event {
            IBaseStrategyEvents::StrategyPaused(_) | IBaseStrategyEvents::EmergencyWithdraw(_) => {
                self.set_paused(meta.address, true).await?;
            }
            IBaseStrategyEvents::StrategyUnpaused(_) => {
                self.set_paused(meta.address, false).await?;
            }
            IBaseStrategyEvents::Pull(_)
            | IBaseStrategyEvents::Push(_)
            | IBaseStrategyEvents::Report(_) => {
                self.refresh_total_assets(meta.address, meta.block_number)
                    .await?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Create or reset the meta info of a strategy joining the vault.
    async fn register(&self, strategy: Address, meta: &EventMeta) -> Result<(), ProjectorError> {
        let id = hex_address(strategy);
        let mut info = self
            .store
            .load_meta_info(&id)
            .await?
            .unwrap_or_else(|| StrategyMetaInfo::new(id.clone()));

        info.vault = Some(hex_address(meta.address));
        info.added_at = Some(meta.block_timestamp);
        info.is_paused = false;
        info.total_assets = BigDecimal::from(0);
        // Earliest registration wins, so a replayed or re-added strategy
        // keeps the logs it already had.
        if info.tracked_from().is_none() {
            info.tracked_from_block = Some(meta.block_number as i64);
            info.tracked_from_log_index = Some(meta.log_index as i64);
        }

        match self.chain.strategy_name(strategy, meta.block_number).await {
            Some(name) => info.name = Some(name),
            None => tracing::debug!("[EventProjector] 🏷️ No name for strategy {id}"),
        }

        self.store.save_meta_info(info).await?;
        tracing::info!(
            "[EventProjector] ➕ Strategy {id} added to vault {} at block {}",
            hex_address(meta.address),
            meta.block_number
        );
        Ok(())
    }

    /// Mark a known strategy as removed. Unknown strategies are ignored.
    async fn retire(&self, strategy: Address, at: DateTime<Utc>) -> Result<(), ProjectorError> {
        let id = hex_address(strategy);
        let Some(mut info) = self.store.load_meta_info(&id).await? else {
            return Ok(());
        };

        info.removed_at = Some(at);
        info.is_paused = true;
        info.share_percent = Some(BigDecimal::from(0));
        info.total_assets = BigDecimal::from(0);

        self.store.save_meta_info(info).await?;
        tracing::info!("[EventProjector] ➖ Strategy {id} removed");
        Ok(())
    }

    async fn set_paused(&self, strategy: Address, paused: bool) -> Result<(), ProjectorError> {
        let id = hex_address(strategy);
        let Some(mut info) = self.store.load_meta_info(&id).await? else {
            return Ok(());
        };

        info.is_paused = paused;
        self.store.save_meta_info(info).await?;
        Ok(())
    }

    async fn refresh_total_assets(&self, strategy: Address, block: u64) -> Result<(), ProjectorError> {
        let id = hex_address(strategy);
        let Some(mut info) = self.store.load_meta_info(&id).await? else {
            return Ok(());
        };

        let Some(total_assets) = self.chain.last_total_assets(strategy, block).await else {
            tracing::debug!("[EventProjector] 💤 Keeping total assets of {id}, read failed");
            return Ok(());
        };

        info.total_assets = u256_to_decimal(total_assets);
        self.store.save_meta_info(info).await?;
        Ok(())
    }

    /// Creates the row when it is missing, unlike the other updates.
    async fn set_share_percent(&self, strategy: Address, percent: U256) -> Result<(), ProjectorError> {
        let id = hex_address(strategy);
        let mut info = self
            .store
            .load_meta_info(&id)
            .await?
            .unwrap_or_else(|| StrategyMetaInfo::new(id));

        info.share_percent = Some(u256_to_decimal(percent));
        self.store.save_meta_info(info).await?;
        Ok(())
    }
}
