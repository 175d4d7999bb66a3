pub mod event_record;
pub mod indexer_state;
pub mod strategy_meta_info;

pub use event_record::{EventRecord, NewEventRecord};
pub use indexer_state::{IndexerState, IndexerStateUpdate, IndexerStatus, NewIndexerState};
pub use strategy_meta_info::StrategyMetaInfo;
