//! Contract bindings shared by the indexer and the keeper.

pub mod abi;
pub mod helpers;
pub mod provider;

pub use abi::{IBaseStrategy, IVault};
pub use helpers::{event_id, hex_address, hex_b256, u256_to_decimal};
pub use provider::{read_only_provider, signer_provider};
