use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use url::Url;

/// HTTP provider without a wallet, for reads and log queries.
pub fn read_only_provider(rpc_url: Url) -> DynProvider {
    ProviderBuilder::new().connect_http(rpc_url).erased()
}

/// HTTP provider signing transactions with `private_key`; returns the
/// provider and the signer address.
pub fn signer_provider(rpc_url: Url, private_key: &str) -> Result<(DynProvider, Address)> {
    let signer: PrivateKeySigner = private_key
        .trim_start_matches("0x")
        .parse()
        .context("Invalid private key")?;
    let address = signer.address();

    let provider = ProviderBuilder::new()
        .wallet(signer)
        .connect_http(rpc_url)
        .erased();

    Ok((provider, address))
}
