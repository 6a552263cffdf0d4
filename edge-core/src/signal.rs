//! Classifier signals after validation

use crate::market::MarketRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Market direction the signal leans towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Yes,
    No,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Yes => "YES",
            Direction::No => "NO",
        }
    }

    /// Exact, case-sensitive match on `"YES"` / `"NO"`
    pub fn parse_exact(s: &str) -> Option<Self> {
        match s {
            "YES" => Some(Direction::Yes),
            "NO" => Some(Direction::No),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk level attached to a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(RiskLevel::Low),
            "medium" => Some(RiskLevel::Medium),
            "high" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Kind of DeFi follow-up action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Swap,
    Stake,
    Lend,
    Borrow,
    Farm,
    Withdraw,
    Prepare,
    /// Anything the classifier invents; logged and skipped by the simulator
    Other(String),
}

impl ActionKind {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "swap" => ActionKind::Swap,
            "stake" => ActionKind::Stake,
            "lend" => ActionKind::Lend,
            "borrow" => ActionKind::Borrow,
            "farm" => ActionKind::Farm,
            "withdraw" => ActionKind::Withdraw,
            "prepare" => ActionKind::Prepare,
            other => ActionKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Swap => write!(f, "swap"),
            ActionKind::Stake => write!(f, "stake"),
            ActionKind::Lend => write!(f, "lend"),
            ActionKind::Borrow => write!(f, "borrow"),
            ActionKind::Farm => write!(f, "farm"),
            ActionKind::Withdraw => write!(f, "withdraw"),
            ActionKind::Prepare => write!(f, "prepare"),
            ActionKind::Other(kind) => write!(f, "{}", kind),
        }
    }
}

/// When a follow-up action should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Timing {
    Immediate,
    OnEvent,
    Gradual,
    Monitor,
}

impl Timing {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "immediate" => Some(Timing::Immediate),
            "on-event" | "on_event" => Some(Timing::OnEvent),
            "gradual" => Some(Timing::Gradual),
            "monitor" => Some(Timing::Monitor),
            _ => None,
        }
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timing::Immediate => write!(f, "immediate"),
            Timing::OnEvent => write!(f, "on-event"),
            Timing::Gradual => write!(f, "gradual"),
            Timing::Monitor => write!(f, "monitor"),
        }
    }
}

/// A concrete DeFi step suggested alongside a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefiAction {
    /// e.g. "aave", "lido", "uniswap"
    pub protocol: String,
    pub action_type: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_asset: Option<String>,
    /// Percentage or amount, e.g. "50%" or "1000 USDC"
    pub allocation: String,
    pub timing: Timing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_condition: Option<String>,
    /// Execution order, lower runs first
    pub priority: u32,
}

/// A classifier signal with every required field present and typed
///
/// Only the validator constructs these from untrusted input; a signal that
/// fails any check is discarded whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedSignal {
    pub trade: bool,
    pub action: Direction,
    /// 0-100
    pub confidence: f64,
    pub reasoning: String,
    pub strategy_type: String,
    pub strategy_description: String,
    pub macro_implication: String,
    pub risk_level: RiskLevel,
    pub target_return: String,
    pub defi_actions: Vec<DefiAction>,
}

/// A market paired with its validated signal for the current cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedMarket {
    pub market: MarketRecord,
    pub signal: ValidatedSignal,
    /// First outcome probability, 0-100
    pub probability: Decimal,
    pub volume: Decimal,
    pub liquidity: Decimal,
}

impl AnalyzedMarket {
    pub fn new(market: MarketRecord, signal: ValidatedSignal) -> Self {
        Self {
            probability: market.probability(),
            volume: market.volume_24h,
            liquidity: market.liquidity,
            market,
            signal,
        }
    }

    /// Whether the signal asks for action at or above the given confidence
    pub fn is_actionable(&self, min_confidence: f64) -> bool {
        self.signal.trade && self.signal.confidence >= min_confidence
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn signal(trade: bool, confidence: f64) -> ValidatedSignal {
        ValidatedSignal {
            trade,
            action: Direction::Yes,
            confidence,
            reasoning: "Rate cuts favor risk assets".to_string(),
            strategy_type: "RATE_CUT_PLAY".to_string(),
            strategy_description: "Lend stables now, rotate to ETH on confirmation".to_string(),
            macro_implication: "Cheaper money favors ETH".to_string(),
            risk_level: RiskLevel::Medium,
            target_return: "15-25%".to_string(),
            defi_actions: Vec::new(),
        }
    }
}
