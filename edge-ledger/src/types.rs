//! Ledger errors and chain constants

use alloy::primitives::U256;
use edge_core::EdgeError;
use thiserror::Error;

/// Monad testnet
pub const MONAD_TESTNET_CHAIN_ID: u64 = 10143;

/// MON and EDGE both use 18 decimals
pub const NATIVE_DECIMALS: u32 = 18;

/// Below this native balance the agent may not afford publishing gas
pub const LOW_BALANCE_WEI: u128 = 10_000_000_000_000_000; // 0.01 MON

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Ledger configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract call failed: {0}")]
    Contract(String),

    #[error("Transaction {0} reverted")]
    Reverted(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<LedgerError> for EdgeError {
    fn from(err: LedgerError) -> Self {
        EdgeError::ledger(err.to_string())
    }
}

/// Clamp a uint256 to u128; token balances above 2^128 are not meaningful here
pub fn u256_to_u128(value: U256) -> u128 {
    u128::try_from(value).unwrap_or(u128::MAX)
}

pub fn u256_to_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Format a base-unit amount with 18 decimals to `places` digits, rounding down
pub fn format_units(raw: u128, places: usize) -> String {
    let unit = 10u128.pow(NATIVE_DECIMALS);
    let whole = raw / unit;
    let frac = raw % unit;
    if places == 0 {
        return whole.to_string();
    }
    let frac = format!("{:018}", frac);
    format!("{}.{}", whole, &frac[..places.min(18)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u256_saturates() {
        assert_eq!(u256_to_u128(U256::from(42u64)), 42);
        assert_eq!(u256_to_u128(U256::MAX), u128::MAX);
        assert_eq!(u256_to_u64(U256::from(u128::MAX)), u64::MAX);
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(LOW_BALANCE_WEI, 4), "0.0100");
        assert_eq!(format_units(1_500_000_000_000_000_000, 2), "1.50");
        assert_eq!(format_units(2_000_000_000_000_000_000_000, 0), "2000");
        assert_eq!(format_units(0, 4), "0.0000");
    }

    #[test]
    fn test_into_edge_error() {
        let err: EdgeError = LedgerError::Reverted("0xabc".to_string()).into();
        assert!(matches!(err, EdgeError::Ledger(msg) if msg.contains("0xabc")));
    }
}
