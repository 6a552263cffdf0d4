//! Gamma API response types
//!
//! The Gamma API is loose about types: numeric fields arrive as numbers or
//! strings, and `outcomePrices` is usually a JSON-encoded string but
//! occasionally a real array. These types accept both and convert to
//! [`MarketRecord`].

use edge_core::MarketRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// A number that may be encoded as a JSON number or a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            LooseNumber::Number(n) => Decimal::from_str(&n.to_string()).ok(),
            LooseNumber::Text(s) => Decimal::from_str(s.trim()).ok(),
        }
    }
}

/// Accept `outcomePrices` as a JSON string or an inline array
fn de_outcome_prices<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(v @ serde_json::Value::Array(_)) => Some(v.to_string()),
        _ => None,
    })
}

/// A market from `GET /markets`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GammaMarket {
    pub id: String,

    pub question: String,

    #[serde(default)]
    pub slug: Option<String>,

    /// Condition ID (used for CLOB)
    #[serde(default)]
    pub condition_id: Option<String>,

    #[serde(default, rename = "volume24hr")]
    pub volume_24hr: Option<LooseNumber>,

    #[serde(default)]
    pub liquidity: Option<LooseNumber>,

    #[serde(default)]
    pub liquidity_num: Option<f64>,

    /// Outcome prices, e.g. `"[\"0.65\", \"0.35\"]"`
    #[serde(default, deserialize_with = "de_outcome_prices")]
    pub outcome_prices: Option<String>,

    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default)]
    pub closed: Option<bool>,

    #[serde(default)]
    pub accepting_orders: Option<bool>,
}

impl GammaMarket {
    pub fn parse_volume_24h(&self) -> Decimal {
        self.volume_24hr
            .as_ref()
            .and_then(LooseNumber::to_decimal)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn parse_liquidity(&self) -> Decimal {
        if let Some(l) = self.liquidity_num {
            if let Ok(d) = Decimal::from_str(&l.to_string()) {
                return d;
            }
        }

        self.liquidity
            .as_ref()
            .and_then(LooseNumber::to_decimal)
            .unwrap_or(Decimal::ZERO)
    }

    /// Convert to the agent's market snapshot
    ///
    /// Missing `active` / `closed` flags are read conservatively so the
    /// filter drops the record rather than trading on guesses.
    pub fn into_record(self) -> MarketRecord {
        let volume_24h = self.parse_volume_24h();
        let liquidity = self.parse_liquidity();

        MarketRecord {
            id: self.condition_id.unwrap_or_else(|| self.id.clone()),
            slug: self.slug.unwrap_or_else(|| self.id.clone()),
            question: self.question,
            volume_24h,
            liquidity,
            outcome_prices: self.outcome_prices,
            active: self.active.unwrap_or(false),
            closed: self.closed.unwrap_or(true),
            accepting_orders: self.accepting_orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_typical_market() {
        let market: GammaMarket = serde_json::from_value(json!({
            "id": "512345",
            "question": "Will the Fed cut rates in March?",
            "slug": "fed-cut-march",
            "conditionId": "0xabc",
            "volume24hr": 125000.5,
            "liquidity": "48000.25",
            "outcomePrices": "[\"0.62\", \"0.38\"]",
            "active": true,
            "closed": false,
            "acceptingOrders": true
        }))
        .unwrap();

        let record = market.into_record();
        assert_eq!(record.id, "0xabc");
        assert_eq!(record.slug, "fed-cut-march");
        assert_eq!(record.volume_24h, dec!(125000.5));
        assert_eq!(record.liquidity, dec!(48000.25));
        assert_eq!(record.probability(), dec!(62));
        assert_eq!(record.accepting_orders, Some(true));
    }

    #[test]
    fn test_outcome_prices_as_inline_array() {
        let market: GammaMarket = serde_json::from_value(json!({
            "id": "1",
            "question": "Q?",
            "outcomePrices": [0.3, 0.7]
        }))
        .unwrap();

        assert_eq!(market.into_record().probability(), dec!(30));
    }

    #[test]
    fn test_missing_fields_are_conservative() {
        let market: GammaMarket = serde_json::from_value(json!({
            "id": "2",
            "question": "Sparse?",
            "volume24hr": "not a number"
        }))
        .unwrap();

        let record = market.into_record();
        assert_eq!(record.slug, "2");
        assert_eq!(record.volume_24h, Decimal::ZERO);
        assert_eq!(record.liquidity, Decimal::ZERO);
        assert!(!record.active);
        assert!(record.closed);
        assert_eq!(record.accepting_orders, None);
    }

    #[test]
    fn test_liquidity_num_preferred() {
        let market: GammaMarket = serde_json::from_value(json!({
            "id": "3",
            "question": "Q?",
            "liquidity": "10",
            "liquidityNum": 20.5
        }))
        .unwrap();

        assert_eq!(market.parse_liquidity(), dec!(20.5));
    }
}
