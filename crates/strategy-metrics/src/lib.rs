use std::sync::Arc;

use opentelemetry::{KeyValue, global, metrics::Counter};

const METER_NAME: &str = "strategy-services";

#[derive(Debug)]
pub struct MetricsRegistry {
    pub keeper: Arc<KeeperMetrics>,
    pub indexer: Arc<IndexerMetrics>,
}

impl MetricsRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            keeper: KeeperMetrics::new(),
            indexer: IndexerMetrics::new(),
        })
    }
}

#[derive(Debug)]
pub struct KeeperMetrics {
    outcomes: Counter<u64>,
}

impl KeeperMetrics {
    fn new() -> Arc<Self> {
        let meter = global::meter(METER_NAME);
        let outcomes = meter
            .u64_counter("keeper_outcomes_total")
            .with_description("Number of keeper attempts by outcome status")
            .with_unit("count")
            .init();

        Arc::new(Self { outcomes })
    }

    pub fn record_outcome(&self, strategy: &str, status: &str) {
        self.outcomes.add(
            1,
            &[
                KeyValue::new("strategy", strategy.to_string()),
                KeyValue::new("status", status.to_string()),
            ],
        );
    }
}

#[derive(Debug)]
pub struct IndexerMetrics {
    projected_events: Counter<u64>,
}

impl IndexerMetrics {
    fn new() -> Arc<Self> {
        let meter = global::meter(METER_NAME);
        let projected_events = meter
            .u64_counter("projected_events_total")
            .with_description("Number of on-chain events projected into the store")
            .with_unit("count")
            .init();

        Arc::new(Self { projected_events })
    }

    pub fn record_projected(&self, contract: &str, kind: &str) {
        self.projected_events.add(
            1,
            &[
                KeyValue::new("contract", contract.to_string()),
                KeyValue::new("kind", kind.to_string()),
            ],
        );
    }
}
