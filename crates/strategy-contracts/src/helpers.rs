use alloy::primitives::{Address, B256, U256};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};

/// Lowercase `0x`-prefixed form used for every stored address
pub fn hex_address(address: Address) -> String {
    format!("{address:#x}")
}

pub fn hex_b256(value: B256) -> String {
    format!("{value:#x}")
}

/// Identity of an event record: the transaction hash bytes followed by the
/// log index as a little-endian `i32`.
pub fn event_id(transaction_hash: B256, log_index: u64) -> String {
    let index = log_index as i32;
    format!(
        "{}{}",
        hex_b256(transaction_hash),
        hex::encode(index.to_le_bytes())
    )
}

pub fn u256_to_decimal(value: U256) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &value.to_be_bytes::<32>());
    BigDecimal::new(digits, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{address, b256};
    use std::str::FromStr;

    #[test]
    fn test_hex_address_is_lowercase() {
        let strategy = address!("0x341A2c85C499895331fa2977EB1908939676cE83");
        assert_eq!(
            hex_address(strategy),
            "0x341a2c85c499895331fa2977eb1908939676ce83"
        );
    }

    #[test]
    fn test_event_id_appends_little_endian_log_index() {
        let tx = b256!("0xa16081f360e3847006db660bae1c6d1b2e17ec2a000000000000000000000001");
        let id = event_id(tx, 1);
        assert_eq!(
            id,
            "0xa16081f360e3847006db660bae1c6d1b2e17ec2a00000000000000000000000101000000"
        );
        assert_eq!(id.len(), 2 + 64 + 8);
        assert_ne!(id, event_id(tx, 256));
    }

    #[test]
    fn test_u256_to_decimal_keeps_full_precision() {
        assert_eq!(u256_to_decimal(U256::ZERO), BigDecimal::from(0));
        assert_eq!(
            u256_to_decimal(U256::MAX),
            BigDecimal::from_str(
                "115792089237316195423570985008687907853269984665640564039457584007913129639935"
            )
            .unwrap()
        );
    }
}
