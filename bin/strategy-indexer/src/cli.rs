use alloy::primitives::Address;
use clap::Parser;
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "Vault and strategy event indexer", long_about = None)]
pub struct IndexerCli {
    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// JSON-RPC endpoint of the chain
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: Url,

    /// Vault addresses to index
    #[arg(long, env = "VAULT_ADDRESSES", value_delimiter = ',', required = true)]
    pub vault_addresses: Vec<Address>,

    /// Block to start from when a vault has no stored cursor
    #[arg(long, env = "START_BLOCK", default_value = "0")]
    pub start_block: u64,

    /// Blocks fetched per `eth_getLogs` request
    #[arg(long, env = "BLOCK_CHUNK_SIZE", default_value = "2000")]
    pub block_chunk_size: u64,

    /// Seconds between polls once synced
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "12")]
    pub poll_interval_secs: u64,
}
