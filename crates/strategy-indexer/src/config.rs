use std::time::Duration;

/// Tuning of the log polling loop.
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Sleep between polls once the chain head is reached
    pub poll_interval: Duration,
    /// Blocks covered by one `eth_getLogs` request
    pub block_chunk_size: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(12),
            block_chunk_size: 2000,
        }
    }
}
