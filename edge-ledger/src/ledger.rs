//! Ledger read and write seams

use alloy::primitives::Address;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edge_core::{PublishRequest, PublishedItem};

use crate::types::Result;

/// Outcome of a confirmed publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

/// Writes strategies; each call returns only after the transaction is final
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt>;
}

/// Read-only view of published strategies and holder access
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn strategy_count(&self) -> Result<u64>;

    /// Up to `count` most recent strategies, oldest first as stored
    async fn latest_strategies(&self, count: u64) -> Result<Vec<PublishedItem>>;

    /// Tier number (1-4) as computed by the contract
    async fn tier_number(&self, holder: Address) -> Result<u8>;

    /// EDGE balance in base units, `None` when no token address is configured
    async fn token_balance(&self, holder: Address) -> Result<Option<u128>>;

    /// Whether `holder` may see strategy `id`, and when it unlocks for them
    async fn access(&self, id: u64, holder: Address) -> Result<(bool, DateTime<Utc>)>;
}
