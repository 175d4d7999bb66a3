pub mod chain;
pub mod config;
pub mod events;
pub mod projector;
pub mod store;
pub mod vaults;

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use alloy::providers::DynProvider;
use deadpool_diesel::postgres::Pool;
use strategy_contracts::hex_address;
use strategy_metrics::IndexerMetrics;
use task_supervisor::SupervisorBuilder;

pub use chain::RpcChainReader;
pub use config::IndexerConfig;
pub use events::{ContractEvent, EventKind, EventMeta};
pub use projector::{ChainReader, EventProjector, ProjectorError, Store};
pub use store::{MemoryStore, PgStore};

use crate::vaults::{evm::EvmIndexer, state::VaultState};

pub struct IndexerService {
    db_pool: Pool,
    provider: DynProvider,
    vault_addresses: Vec<Address>,
    start_block: u64,
    config: IndexerConfig,
    metrics: Arc<IndexerMetrics>,
}

impl IndexerService {
    pub const fn new(
        db_pool: Pool,
        provider: DynProvider,
        vault_addresses: Vec<Address>,
        start_block: u64,
        config: IndexerConfig,
        metrics: Arc<IndexerMetrics>,
    ) -> Self {
        Self {
            db_pool,
            provider,
            vault_addresses,
            start_block,
            config,
            metrics,
        }
    }

    pub async fn run_forever(&self) -> anyhow::Result<()> {
        if self.vault_addresses.is_empty() {
            anyhow::bail!("No vault to index!");
        }

        let mut supervisor = SupervisorBuilder::default()
            .with_dead_tasks_threshold(Some(0.5))
            .with_base_restart_delay(Duration::from_millis(500))
            .with_max_restart_attempts(5)
            .with_task_being_stable_after(Duration::from_secs(120))
            .with_health_check_interval(Duration::from_secs(5));

        let store: Arc<dyn Store> = Arc::new(PgStore::new(self.db_pool.clone()));
        let chain: Arc<dyn ChainReader> = Arc::new(RpcChainReader::new(self.provider.clone()));
        let projector = Arc::new(EventProjector::new(
            store.clone(),
            chain,
            self.metrics.clone(),
        ));

        for vault_address in &self.vault_addresses {
            let vault = hex_address(*vault_address);
            tracing::info!(
                "Starting indexer for vault: {vault} (configured start block {})",
                self.start_block
            );
            supervisor = supervisor.with_task(
                &vault,
                EvmIndexer {
                    vault_address: *vault_address,
                    provider: self.provider.clone(),
                    projector: projector.clone(),
                    store: store.clone(),
                    config: self.config.clone(),
                    state: VaultState::new(vault.clone(), self.start_block, self.db_pool.clone()),
                },
            );
        }

        let supervisor_handle = supervisor.build().run();

        supervisor_handle.wait().await?;
        anyhow::bail!("Indexer Supervisor stopped! 😨");
    }
}
