use std::collections::HashMap;

use deadpool_diesel::postgres::Pool;
use strategy_db::models::{EventRecord, NewEventRecord, StrategyMetaInfo};
use strategy_db::{DatabaseError, StrategyPool};
use tokio::sync::Mutex;

use crate::projector::Store;

/// Postgres store shared by every vault indexer.
#[derive(Clone)]
pub struct PgStore {
    db_pool: Pool,
}

impl PgStore {
    pub const fn new(db_pool: Pool) -> Self {
        Self { db_pool }
    }
}

#[async_trait::async_trait]
impl Store for PgStore {
    async fn save_event(&self, record: NewEventRecord) -> Result<bool, DatabaseError> {
        let inserted = self
            .db_pool
            .interact_with_context(
                format!("create {} event record {}", record.kind, record.id),
                move |conn| EventRecord::create(&record, conn),
            )
            .await?;

        Ok(inserted > 0)
    }

    async fn load_meta_info(
        &self,
        strategy: &str,
    ) -> Result<Option<StrategyMetaInfo>, DatabaseError> {
        let id = strategy.to_string();
        self.db_pool
            .interact_with_context(
                format!("load meta info of strategy: {strategy}"),
                move |conn| StrategyMetaInfo::find_by_id(&id, conn),
            )
            .await
    }

    async fn save_meta_info(&self, info: StrategyMetaInfo) -> Result<(), DatabaseError> {
        self.db_pool
            .interact_with_context(
                format!("upsert meta info of strategy: {}", info.id),
                move |conn| info.upsert(conn),
            )
            .await?;

        Ok(())
    }

    async fn strategies_of_vault(
        &self,
        vault: &str,
    ) -> Result<Vec<StrategyMetaInfo>, DatabaseError> {
        let vault = vault.to_string();
        self.db_pool
            .interact_with_context(
                format!("list strategies of vault: {vault}"),
                move |conn| StrategyMetaInfo::find_by_vault(&vault, conn),
            )
            .await
    }
}

/// In-process store, used when no database is at hand.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: Mutex<Vec<NewEventRecord>>,
    meta_info: Mutex<HashMap<String, StrategyMetaInfo>>,
    meta_info_writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored records in insertion order
    pub async fn events(&self) -> Vec<NewEventRecord> {
        self.events.lock().await.clone()
    }

    pub async fn meta_info(&self, strategy: &str) -> Option<StrategyMetaInfo> {
        self.meta_info.lock().await.get(strategy).cloned()
    }

    /// Number of `save_meta_info` calls so far
    pub async fn meta_info_writes(&self) -> usize {
        *self.meta_info_writes.lock().await
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn save_event(&self, record: NewEventRecord) -> Result<bool, DatabaseError> {
        let mut events = self.events.lock().await;
        if events.iter().any(|existing| existing.id == record.id) {
            return Ok(false);
        }
        events.push(record);
        Ok(true)
    }

    async fn load_meta_info(
        &self,
        strategy: &str,
    ) -> Result<Option<StrategyMetaInfo>, DatabaseError> {
        Ok(self.meta_info.lock().await.get(strategy).cloned())
    }

    async fn save_meta_info(&self, info: StrategyMetaInfo) -> Result<(), DatabaseError> {
        *self.meta_info_writes.lock().await += 1;
        self.meta_info.lock().await.insert(info.id.clone(), info);
        Ok(())
    }

    async fn strategies_of_vault(
        &self,
        vault: &str,
    ) -> Result<Vec<StrategyMetaInfo>, DatabaseError> {
        let mut infos: Vec<StrategyMetaInfo> = self
            .meta_info
            .lock()
            .await
            .values()
            .filter(|info| info.vault.as_deref() == Some(vault))
            .cloned()
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(infos)
    }
}
