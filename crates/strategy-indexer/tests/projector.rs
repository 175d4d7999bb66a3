use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, B256, U256, address};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use mockall::mock;
use strategy_contracts::IBaseStrategy::{self, IBaseStrategyEvents};
use strategy_contracts::IVault::{self, IVaultEvents};
use strategy_contracts::hex_address;
use strategy_indexer::{ChainReader, ContractEvent, EventMeta, EventProjector, MemoryStore};
use strategy_metrics::MetricsRegistry;

mock! {
    pub Chain {}

    #[async_trait::async_trait]
    impl ChainReader for Chain {
        async fn strategy_name(&self, strategy: Address, block: u64) -> Option<String>;
        async fn last_total_assets(&self, strategy: Address, block: u64) -> Option<U256>;
    }
}

const VAULT: Address = address!("0x00000000000000000000000000000000000000aa");
const STRATEGY_A: Address = address!("0x341a2c85c499895331fa2977eb1908939676ce83");
const STRATEGY_B: Address = address!("0x00000000000000000000000000000000000000bb");

struct Harness {
    store: Arc<MemoryStore>,
    projector: EventProjector,
    next_log: u64,
}

impl Harness {
    fn new(chain: MockChain) -> Self {
        let store = Arc::new(MemoryStore::new());
        let projector = EventProjector::new(
            store.clone(),
            Arc::new(chain),
            MetricsRegistry::new().indexer.clone(),
        );
        Self {
            store,
            projector,
            next_log: 0,
        }
    }

    /// Project `event` emitted by `emitter` at `block`, in its own transaction.
    async fn emit(&mut self, emitter: Address, block: u64, event: ContractEvent) -> EventMeta {
        self.next_log += 1;
        let meta = EventMeta {
            address: emitter,
            block_number: block,
            block_timestamp: block_time(block),
            transaction_hash: B256::with_last_byte(self.next_log as u8),
            log_index: self.next_log,
        };
        self.projector.project(&meta, &event).await.unwrap();
        meta
    }

    async fn meta_info(&self, strategy: Address) -> Option<strategy_db::models::StrategyMetaInfo> {
        self.store.meta_info(&hex_address(strategy)).await
    }
}

fn block_time(block: u64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000 + block as i64 * 12, 0).unwrap()
}

/// Chain where every read succeeds
fn healthy_chain() -> MockChain {
    let mut chain = MockChain::new();
    chain
        .expect_strategy_name()
        .returning(|_, _| Some("Compound USDC".to_string()));
    chain
        .expect_last_total_assets()
        .returning(|_, _| Some(U256::from(5_000u64)));
    chain
}

fn added(strategy: Address) -> ContractEvent {
    ContractEvent::Vault(IVaultEvents::StrategyAdded(IVault::StrategyAdded { strategy }))
}

fn removed(strategy: Address) -> ContractEvent {
    ContractEvent::Vault(IVaultEvents::StrategyRemoved(IVault::StrategyRemoved {
        strategy,
        totalAssets: U256::from(42u64),
    }))
}

fn migrated(old: Address, new: Address) -> ContractEvent {
    ContractEvent::Vault(IVaultEvents::StrategyMigrated(IVault::StrategyMigrated {
        oldVersion: old,
        newVersion: new,
    }))
}

fn share_percent(strategy: Address, percent: u64) -> ContractEvent {
    ContractEvent::Vault(IVaultEvents::UpdateStrategySharePercent(
        IVault::UpdateStrategySharePercent {
            strategy,
            newPercent: U256::from(percent),
        },
    ))
}

fn paused() -> ContractEvent {
    ContractEvent::Strategy(IBaseStrategyEvents::StrategyPaused(
        IBaseStrategy::StrategyPaused {
            timestamp: U256::from(1u64),
        },
    ))
}

fn unpaused() -> ContractEvent {
    ContractEvent::Strategy(IBaseStrategyEvents::StrategyUnpaused(
        IBaseStrategy::StrategyUnpaused {
            timestamp: U256::from(2u64),
        },
    ))
}

fn pull() -> ContractEvent {
    ContractEvent::Strategy(IBaseStrategyEvents::Pull(IBaseStrategy::Pull {
        assetPull: U256::from(10u64),
    }))
}

#[tokio::test]
async fn test_added_strategy_starts_unpaused_and_empty() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;

    let info = harness.meta_info(STRATEGY_A).await.unwrap();
    assert!(!info.is_paused);
    assert_eq!(info.total_assets, BigDecimal::from(0));
    assert_eq!(info.vault.as_deref(), Some(hex_address(VAULT).as_str()));
    assert_eq!(info.added_at, Some(block_time(10)));
    assert_eq!(info.name.as_deref(), Some("Compound USDC"));
    assert!(info.removed_at.is_none());
}

#[tokio::test]
async fn test_pause_then_unpause() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;

    harness.emit(STRATEGY_A, 11, paused()).await;
    assert!(harness.meta_info(STRATEGY_A).await.unwrap().is_paused);

    harness.emit(STRATEGY_A, 12, unpaused()).await;
    assert!(!harness.meta_info(STRATEGY_A).await.unwrap().is_paused);
}

#[tokio::test]
async fn test_emergency_withdraw_pauses() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;

    let event = ContractEvent::Strategy(IBaseStrategyEvents::EmergencyWithdraw(
        IBaseStrategy::EmergencyWithdraw {
            timestamp: U256::from(3u64),
            amount: U256::from(100u64),
        },
    ));
    harness.emit(STRATEGY_A, 11, event).await;

    assert!(harness.meta_info(STRATEGY_A).await.unwrap().is_paused);
}

#[tokio::test]
async fn test_removed_strategy_is_paused_and_zeroed() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;
    harness.emit(VAULT, 11, share_percent(STRATEGY_A, 4000)).await;
    harness.emit(STRATEGY_A, 12, pull()).await;
    harness.emit(VAULT, 13, removed(STRATEGY_A)).await;

    let info = harness.meta_info(STRATEGY_A).await.unwrap();
    assert!(info.is_paused);
    assert_eq!(info.total_assets, BigDecimal::from(0));
    assert_eq!(info.share_percent, Some(BigDecimal::from(0)));
    assert_eq!(info.removed_at, Some(block_time(13)));
}

#[tokio::test]
async fn test_removing_unknown_strategy_only_stores_the_event() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 10, removed(STRATEGY_A)).await;

    assert!(harness.meta_info(STRATEGY_A).await.is_none());
    assert_eq!(harness.store.meta_info_writes().await, 0);
    assert_eq!(harness.store.events().await.len(), 1);
}

#[tokio::test]
async fn test_migration_retires_old_and_registers_new() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;
    harness.emit(VAULT, 20, migrated(STRATEGY_A, STRATEGY_B)).await;

    let old = harness.meta_info(STRATEGY_A).await.unwrap();
    assert!(old.is_paused);
    assert_eq!(old.removed_at, Some(block_time(20)));

    let new = harness.meta_info(STRATEGY_B).await.unwrap();
    assert!(!new.is_paused);
    assert_eq!(new.total_assets, BigDecimal::from(0));
    assert_eq!(new.added_at, Some(block_time(20)));
    assert_eq!(new.vault.as_deref(), Some(hex_address(VAULT).as_str()));
}

#[tokio::test]
async fn test_flow_events_refresh_total_assets() {
    let mut chain = MockChain::new();
    chain.expect_strategy_name().returning(|_, _| None);
    chain
        .expect_last_total_assets()
        .withf(|strategy, block| *strategy == STRATEGY_A && *block == 11)
        .times(1)
        .returning(|_, _| Some(U256::from(1_234_567u64)));

    let mut harness = Harness::new(chain);
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;
    harness.emit(STRATEGY_A, 11, pull()).await;

    assert_eq!(
        harness.meta_info(STRATEGY_A).await.unwrap().total_assets,
        BigDecimal::from(1_234_567)
    );
}

#[tokio::test]
async fn test_failed_total_assets_read_keeps_previous_value() {
    let mut chain = MockChain::new();
    chain.expect_strategy_name().returning(|_, _| None);
    let mut reads = 0;
    chain.expect_last_total_assets().returning(move |_, _| {
        reads += 1;
        (reads == 1).then(|| U256::from(900u64))
    });

    let mut harness = Harness::new(chain);
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;
    harness.emit(STRATEGY_A, 11, pull()).await;

    let report = ContractEvent::Strategy(IBaseStrategyEvents::Report(IBaseStrategy::Report {
        time: U256::from(12u64),
        profit: U256::from(1u64),
        loss: U256::ZERO,
    }));
    harness.emit(STRATEGY_A, 12, report).await;

    assert_eq!(
        harness.meta_info(STRATEGY_A).await.unwrap().total_assets,
        BigDecimal::from(900)
    );
}

#[tokio::test]
async fn test_flow_events_of_unknown_strategy_only_store_the_event() {
    let mut chain = MockChain::new();
    chain.expect_last_total_assets().never();

    let mut harness = Harness::new(chain);
    harness.emit(STRATEGY_A, 10, pull()).await;

    let push = ContractEvent::Strategy(IBaseStrategyEvents::Push(IBaseStrategy::Push {
        assetPush: U256::from(3u64),
    }));
    harness.emit(STRATEGY_A, 11, push).await;
    harness.emit(STRATEGY_A, 12, paused()).await;

    assert!(harness.meta_info(STRATEGY_A).await.is_none());
    assert_eq!(harness.store.meta_info_writes().await, 0);

    let events = harness.store.events().await;
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, "StrategyPull");
    assert_eq!(events[1].kind, "StrategyPush");
    assert_eq!(events[2].kind, "StrategyPaused");
}

#[tokio::test]
async fn test_failed_name_read_leaves_name_unset() {
    let mut chain = MockChain::new();
    chain.expect_strategy_name().returning(|_, _| None);

    let mut harness = Harness::new(chain);
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;

    let info = harness.meta_info(STRATEGY_A).await.unwrap();
    assert!(info.name.is_none());
    assert!(!info.is_paused);
}

#[tokio::test]
async fn test_share_percent_creates_missing_meta_info() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 10, share_percent(STRATEGY_B, 2500)).await;

    let info = harness.meta_info(STRATEGY_B).await.unwrap();
    assert_eq!(info.share_percent, Some(BigDecimal::from(2500)));
    assert!(!info.is_paused);
    assert_eq!(info.total_assets, BigDecimal::from(0));
    assert!(info.vault.is_none());
    assert!(info.added_at.is_none());
}

#[tokio::test]
async fn test_re_adding_keeps_removal_and_share_percent() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;
    harness.emit(VAULT, 11, share_percent(STRATEGY_A, 1000)).await;
    harness.emit(VAULT, 12, removed(STRATEGY_A)).await;
    harness.emit(VAULT, 13, added(STRATEGY_A)).await;

    let info = harness.meta_info(STRATEGY_A).await.unwrap();
    assert!(!info.is_paused);
    assert_eq!(info.added_at, Some(block_time(13)));
    assert_eq!(info.removed_at, Some(block_time(12)));
    assert_eq!(info.share_percent, Some(BigDecimal::from(0)));
}

#[tokio::test]
async fn test_redelivered_event_is_stored_once() {
    let mut harness = Harness::new(healthy_chain());
    let meta = harness.emit(VAULT, 10, added(STRATEGY_A)).await;

    harness.projector.project(&meta, &added(STRATEGY_A)).await.unwrap();

    let events = harness.store.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, meta.record_id());
}

#[tokio::test]
async fn test_record_ids_are_unique_per_log() {
    let mut harness = Harness::new(healthy_chain());
    let transfer = |value: u64| {
        ContractEvent::Vault(IVaultEvents::Transfer(IVault::Transfer {
            from: Address::ZERO,
            to: STRATEGY_B,
            value: U256::from(value),
        }))
    };

    for value in 0..5 {
        harness.emit(VAULT, 10, transfer(value)).await;
    }

    let events = harness.store.events().await;
    assert_eq!(events.len(), 5);
    for event in &events {
        let expected = strategy_contracts::event_id(
            B256::from_str(&event.transaction_hash).unwrap(),
            event.log_index as u64,
        );
        assert_eq!(event.id, expected);
        assert_eq!(event.kind, "Transfer");
    }
}

fn push() -> ContractEvent {
    ContractEvent::Strategy(IBaseStrategyEvents::Push(IBaseStrategy::Push {
        assetPush: U256::from(3u64),
    }))
}

fn report() -> ContractEvent {
    ContractEvent::Strategy(IBaseStrategyEvents::Report(IBaseStrategy::Report {
        time: U256::from(12u64),
        profit: U256::from(1u64),
        loss: U256::ZERO,
    }))
}

#[tokio::test]
async fn test_report_of_unknown_strategy_only_stores_the_event() {
    let mut chain = MockChain::new();
    chain.expect_last_total_assets().never();

    let mut harness = Harness::new(chain);
    harness.emit(STRATEGY_A, 10, report()).await;

    assert!(harness.meta_info(STRATEGY_A).await.is_none());
    assert_eq!(harness.store.meta_info_writes().await, 0);

    let events = harness.store.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "StrategyReport");
}

#[tokio::test]
async fn test_push_refreshes_total_assets_of_known_strategy() {
    let mut chain = MockChain::new();
    chain.expect_strategy_name().returning(|_, _| None);
    chain
        .expect_last_total_assets()
        .withf(|strategy, block| *strategy == STRATEGY_A && *block == 15)
        .times(1)
        .returning(|_, _| Some(U256::from(77_000u64)));

    let mut harness = Harness::new(chain);
    harness.emit(VAULT, 10, added(STRATEGY_A)).await;
    harness.emit(STRATEGY_A, 15, push()).await;

    let info = harness.meta_info(STRATEGY_A).await.unwrap();
    assert_eq!(info.total_assets, BigDecimal::from(77_000));
    assert_eq!(harness.store.meta_info_writes().await, 2);
}

#[tokio::test]
async fn test_migration_from_unknown_strategy_only_registers_new() {
    let mut harness = Harness::new(healthy_chain());
    harness.emit(VAULT, 20, migrated(STRATEGY_A, STRATEGY_B)).await;

    assert!(harness.meta_info(STRATEGY_A).await.is_none());

    let new = harness.meta_info(STRATEGY_B).await.unwrap();
    assert!(!new.is_paused);
    assert_eq!(new.added_at, Some(block_time(20)));
    assert_eq!(new.vault.as_deref(), Some(hex_address(VAULT).as_str()));
    assert_eq!(harness.store.meta_info_writes().await, 1);
}

#[tokio::test]
async fn test_registration_position_is_kept_from_first_add() {
    let mut harness = Harness::new(healthy_chain());
    let first = harness.emit(VAULT, 10, added(STRATEGY_A)).await;
    harness.emit(VAULT, 12, removed(STRATEGY_A)).await;
    harness.emit(VAULT, 13, added(STRATEGY_A)).await;

    let info = harness.meta_info(STRATEGY_A).await.unwrap();
    assert_eq!(info.tracked_from(), Some((10, first.log_index)));
}
