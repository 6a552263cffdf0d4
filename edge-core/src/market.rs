//! Market snapshot fetched once per cycle

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Probability assumed when a market's outcome prices cannot be read
pub const NEUTRAL_PROBABILITY: Decimal = dec!(50);

/// One prediction market as seen by the agent
///
/// Immutable snapshot: records are fetched fresh every cycle and never
/// persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    /// Platform identifier (condition id when available)
    pub id: String,

    /// Human-readable question
    pub question: String,

    /// URL slug
    pub slug: String,

    /// Trading volume over the last 24 hours
    pub volume_24h: Decimal,

    /// Available liquidity
    pub liquidity: Decimal,

    /// Raw outcome price list as delivered by the API
    /// (e.g. `["0.72", "0.28"]` encoded as a JSON string)
    pub outcome_prices: Option<String>,

    pub active: bool,
    pub closed: bool,

    /// `None` when the API omits the flag; only an explicit `false` blocks trading
    pub accepting_orders: Option<bool>,
}

impl MarketRecord {
    /// Probability of the first outcome as a percentage, if it can be read
    ///
    /// Accepts a JSON array of strings (`["0.72","0.28"]`) or numbers
    /// (`[0.72, 0.28]`). Anything else, including an empty list or a
    /// price outside [0, 1], yields `None`.
    pub fn quoted_probability(&self) -> Option<Decimal> {
        let raw = self.outcome_prices.as_deref()?;

        let first = if let Ok(prices) = serde_json::from_str::<Vec<String>>(raw) {
            Decimal::from_str(prices.first()?.trim()).ok()?
        } else if let Ok(prices) = serde_json::from_str::<Vec<f64>>(raw) {
            Decimal::from_str(&prices.first()?.to_string()).ok()?
        } else {
            return None;
        };

        if first < Decimal::ZERO || first > Decimal::ONE {
            return None;
        }

        Some(first * dec!(100))
    }

    /// Probability of the first outcome as a percentage, defaulting to 50
    pub fn probability(&self) -> Decimal {
        self.quoted_probability().unwrap_or(NEUTRAL_PROBABILITY)
    }

    /// Whether the outcome prices had to be defaulted
    pub fn is_unpriced(&self) -> bool {
        self.quoted_probability().is_none()
    }

    /// Public market URL
    pub fn url(&self) -> String {
        format!("https://polymarket.com/event/{}", self.slug)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::tradeable;
    use super::*;

    fn with_prices(prices: Option<&str>) -> MarketRecord {
        MarketRecord {
            outcome_prices: prices.map(str::to_string),
            ..tradeable("m")
        }
    }

    #[test]
    fn test_probability_from_string_array() {
        assert_eq!(with_prices(Some(r#"["0.72", "0.28"]"#)).probability(), dec!(72));
    }

    #[test]
    fn test_probability_from_number_array() {
        assert_eq!(with_prices(Some("[0.05, 0.95]")).probability(), dec!(5));
    }

    #[test]
    fn test_probability_defaults_to_neutral() {
        for raw in [None, Some(""), Some("not json"), Some("[]"), Some(r#"["abc"]"#), Some("[1.5]")] {
            let market = with_prices(raw);
            assert_eq!(market.probability(), NEUTRAL_PROBABILITY, "input {:?}", raw);
            assert!(market.is_unpriced());
        }
    }

    #[test]
    fn test_url() {
        assert_eq!(
            tradeable("btc").url(),
            "https://polymarket.com/event/will-btc-happen"
        );
    }
}
