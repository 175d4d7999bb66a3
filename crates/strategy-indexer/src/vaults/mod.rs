pub mod evm;
pub mod state;
