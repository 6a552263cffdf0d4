//! Market data source seam

use async_trait::async_trait;
use edge_core::{EdgeResult, MarketRecord};

/// Anything that can produce a fresh market snapshot
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Fetch up to `limit` open markets, highest 24h volume first
    async fn fetch_markets(&self, limit: u32) -> EdgeResult<Vec<MarketRecord>>;
}
