//! Strategies committed to the ledger

use crate::signal::{AnalyzedMarket, Direction};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

pub const MAX_SLUG_CHARS: usize = 100;
pub const MAX_QUESTION_CHARS: usize = 200;
pub const MAX_STRATEGY_TYPE_CHARS: usize = 30;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// Truncate to at most `max` chars without splitting a code point
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Arguments for one ledger write, already bounded to contract limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishRequest {
    pub market_slug: String,
    pub question: String,
    pub signal: Direction,
    /// YES probability, rounded to a whole percent
    pub probability: u64,
    pub confidence: u64,
    pub strategy_type: String,
    pub description: String,
}

impl PublishRequest {
    pub fn from_analyzed(analyzed: &AnalyzedMarket) -> Self {
        let probability = analyzed
            .probability
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
            .unwrap_or(50)
            .min(100);

        let confidence = analyzed.signal.confidence.round().clamp(0.0, 100.0) as u64;

        Self {
            market_slug: truncate_chars(&analyzed.market.slug, MAX_SLUG_CHARS),
            question: truncate_chars(&analyzed.market.question, MAX_QUESTION_CHARS),
            signal: analyzed.signal.action,
            probability,
            confidence,
            strategy_type: truncate_chars(&analyzed.signal.strategy_type, MAX_STRATEGY_TYPE_CHARS),
            description: truncate_chars(
                &analyzed.signal.strategy_description,
                MAX_DESCRIPTION_CHARS,
            ),
        }
    }
}

/// A strategy as stored on-chain
///
/// The publish timestamp is set by the contract and never changes, so
/// unlock times derived from it are stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedItem {
    pub id: u64,
    pub market_slug: String,
    pub question: String,
    /// "YES" or "NO" as written by the agent
    pub signal: String,
    pub probability: u64,
    pub confidence: u64,
    pub strategy_type: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub active: bool,
}

impl PublishedItem {
    pub fn direction(&self) -> Option<Direction> {
        Direction::parse_exact(&self.signal)
    }
}
