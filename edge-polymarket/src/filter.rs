//! Reduction of raw market records to a tradeable subset

use edge_core::MarketRecord;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Bounds a market must satisfy to be worth classifying
///
/// Volume and liquidity bounds are strict; the probability band is
/// inclusive on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketFilter {
    pub min_volume_24h: Decimal,
    pub min_liquidity: Decimal,
    pub min_probability: Decimal,
    pub max_probability: Decimal,
    /// Drop markets whose outcome prices could not be read instead of
    /// treating them as 50%
    pub exclude_unpriced: bool,
}

impl Default for MarketFilter {
    fn default() -> Self {
        Self {
            min_volume_24h: dec!(1000),
            min_liquidity: dec!(5000),
            min_probability: dec!(5),
            max_probability: dec!(95),
            exclude_unpriced: false,
        }
    }
}

impl MarketFilter {
    pub fn with_exclude_unpriced(mut self, exclude: bool) -> Self {
        self.exclude_unpriced = exclude;
        self
    }

    /// Whether a single record passes every bound
    pub fn accepts(&self, market: &MarketRecord) -> bool {
        if !market.active || market.closed || market.accepting_orders == Some(false) {
            return false;
        }

        if market.volume_24h <= self.min_volume_24h || market.liquidity <= self.min_liquidity {
            return false;
        }

        let probability = match market.quoted_probability() {
            Some(p) => p,
            None if self.exclude_unpriced => return false,
            None => market.probability(),
        };

        probability >= self.min_probability && probability <= self.max_probability
    }

    /// Keep the records that pass, preserving input order
    pub fn apply(&self, markets: Vec<MarketRecord>) -> Vec<MarketRecord> {
        markets.into_iter().filter(|m| self.accepts(m)).collect()
    }
}
