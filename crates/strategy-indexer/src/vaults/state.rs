use chrono::{DateTime, Utc};
use deadpool_diesel::postgres::Pool;
use strategy_db::StrategyPool;
use strategy_db::models::IndexerState;

/// Resume cursor of one vault indexer, mirrored in `indexer_state`.
#[derive(Clone)]
pub struct VaultState {
    pub vault_address: String,
    /// Next block to fetch
    pub current_block: u64,
    pub db_pool: Pool,
}

impl VaultState {
    pub const fn new(vault_address: String, start_block: u64, db_pool: Pool) -> Self {
        Self {
            vault_address,
            current_block: start_block,
            db_pool,
        }
    }

    /// Load the stored cursor, creating it right before the configured
    /// start block on first run.
    pub async fn load(&mut self) -> Result<(), anyhow::Error> {
        let vault_address = self.vault_address.clone();
        let before_start = i64::try_from(self.current_block)? - 1;

        let state = self
            .db_pool
            .interact_with_context(
                format!("load indexer state for vault: {}", self.vault_address),
                move |conn| IndexerState::find_or_create(&vault_address, before_start, conn),
            )
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "[VaultState({})] 🗃️ Database interaction failed: {e}",
                    self.vault_address
                )
            })?;

        // Chunks are committed whole, so a failed one restarts right after
        // the last committed block.
        self.current_block = (state.last_processed_block + 1) as u64;

        if state.is_error() {
            tracing::warn!(
                "[VaultState({})] ⚠️ Previous error detected, retrying from block {} (last error: {})",
                self.vault_address,
                self.current_block,
                state.last_error.as_deref().unwrap_or("unknown error")
            );
        } else {
            tracing::info!(
                "[VaultState({})] 📍 Resuming from block {}",
                self.vault_address,
                self.current_block
            );
        }

        Ok(())
    }

    /// Persist that every block up to `block_number` was projected.
    pub async fn advance(
        &mut self,
        block_number: u64,
        block_timestamp: Option<DateTime<Utc>>,
    ) -> Result<(), anyhow::Error> {
        let vault_address = self.vault_address.clone();
        let last_processed = i64::try_from(block_number)?;

        self.db_pool
            .interact_with_context(
                format!("update indexer state for vault: {}", self.vault_address),
                move |conn| {
                    IndexerState::advance(&vault_address, last_processed, block_timestamp, conn)
                },
            )
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "[VaultState({})] 🗃️ Indexer state update failed: {e}",
                    self.vault_address
                )
            })?;

        self.current_block = block_number + 1;
        Ok(())
    }

    pub async fn set_synced(&self) -> Result<(), anyhow::Error> {
        let vault_address = self.vault_address.clone();

        self.db_pool
            .interact_with_context(
                format!("set indexer state to synced for vault: {}", self.vault_address),
                move |conn| IndexerState::find_by_vault_address(&vault_address, conn)?.mark_synced(conn),
            )
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "[VaultState({})] 🗃️ Setting synced status failed: {e}",
                    self.vault_address
                )
            })?;

        Ok(())
    }

    pub async fn record_error(&self, error_message: String) -> Result<(), anyhow::Error> {
        let vault_address = self.vault_address.clone();

        self.db_pool
            .interact_with_context(
                format!("record indexer error for vault: {}", self.vault_address),
                move |conn| {
                    IndexerState::find_by_vault_address(&vault_address, conn)?
                        .record_error(error_message, conn)
                },
            )
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "[VaultState({})] 🗃️ Error recording failed: {e}",
                    self.vault_address
                )
            })?;

        Ok(())
    }
}
