//! On-chain store for published strategies
//!
//! The StrategyDAO contract on Monad testnet is the agent's only
//! persistence: the agent appends strategies with its signing key, and the
//! dashboard reads them back together with each holder's access tier.

pub mod client;
pub mod contract;
pub mod ledger;
pub mod types;
pub mod wallet;

pub use alloy::primitives::Address;
pub use client::{parse_address, MonadLedger};
pub use ledger::{LedgerReader, LedgerWriter, PublishReceipt};
pub use types::{format_units, LedgerError, Result, LOW_BALANCE_WEI, MONAD_TESTNET_CHAIN_ID};
pub use wallet::LedgerWallet;
