//! Classifier seam

use crate::validate::RawSignal;
use async_trait::async_trait;
use edge_core::{EdgeResult, MarketRecord};

/// Turns one market into one raw signal
///
/// Failures are per market; callers drop the market and move on.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, market: &MarketRecord) -> EdgeResult<RawSignal>;
}
