//! Parse-then-validate boundary for classifier output
//!
//! The model's JSON is never trusted. Required fields must be present with
//! the exact type, optional fields are defaulted, and any violation rejects
//! the whole signal with a reason. There are no partial signals.

use edge_core::{ActionKind, DefiAction, Direction, RiskLevel, Timing, ValidatedSignal};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_RISK_LEVEL: RiskLevel = RiskLevel::Medium;
pub const DEFAULT_TARGET_RETURN: &str = "TBD";
pub const DEFAULT_STRATEGY_TYPE: &str = "RISK_OFF";

/// Why a classifier answer was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidSignal {
    #[error("response contains no JSON object")]
    NoJson,

    #[error("response is not valid JSON: {0}")]
    Malformed(String),

    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("`trade` must be a boolean")]
    TradeNotBoolean,

    #[error("`action` must be exactly \"YES\" or \"NO\"")]
    InvalidAction,

    #[error("`confidence` must be a number")]
    ConfidenceNotNumeric,

    #[error("`confidence` {0} is outside 0-100")]
    ConfidenceOutOfRange(f64),

    #[error("`defiActions` is missing or not a list")]
    MissingDefiActions,

    #[error("defiActions[{index}]: {reason}")]
    InvalidDefiAction { index: usize, reason: String },
}

/// Untrusted classifier output
#[derive(Debug, Clone, PartialEq)]
pub struct RawSignal(Value);

impl RawSignal {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a model response, tolerating markdown fences or chatter
    /// around a single JSON object
    pub fn parse(content: &str) -> Result<Self, InvalidSignal> {
        let json = extract_json(content).ok_or(InvalidSignal::NoJson)?;
        serde_json::from_str(json)
            .map(Self)
            .map_err(|e| InvalidSignal::Malformed(e.to_string()))
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RawSignal {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn extract_json(content: &str) -> Option<&str> {
    // Try to find JSON in code blocks first
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return Some(content[start..start + end].trim());
        }
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (start < end).then(|| &content[start..=end])
}

/// Which signal shape the validator enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVersion {
    /// Direction, confidence and text only
    Basic,
    /// Basic plus a mandatory `defiActions` list
    #[default]
    Strict,
}

impl SchemaVersion {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            SchemaVersion::Strict
        } else {
            SchemaVersion::Basic
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SignalValidator {
    schema: SchemaVersion,
}

impl SignalValidator {
    pub fn new(schema: SchemaVersion) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> SchemaVersion {
        self.schema
    }

    pub fn validate(&self, raw: &RawSignal) -> Result<ValidatedSignal, InvalidSignal> {
        let obj = raw.as_value().as_object().ok_or(InvalidSignal::NotAnObject)?;

        let trade = obj
            .get("trade")
            .and_then(Value::as_bool)
            .ok_or(InvalidSignal::TradeNotBoolean)?;

        let action = obj
            .get("action")
            .and_then(Value::as_str)
            .and_then(Direction::parse_exact)
            .ok_or(InvalidSignal::InvalidAction)?;

        let confidence = obj
            .get("confidence")
            .and_then(Value::as_f64)
            .ok_or(InvalidSignal::ConfidenceNotNumeric)?;
        if !confidence.is_finite() || !(0.0..=100.0).contains(&confidence) {
            return Err(InvalidSignal::ConfidenceOutOfRange(confidence));
        }

        let defi_actions = match (self.schema, obj.get("defiActions")) {
            (_, Some(Value::Array(items))) => self.parse_actions(items)?,
            (SchemaVersion::Strict, _) => return Err(InvalidSignal::MissingDefiActions),
            (SchemaVersion::Basic, _) => Vec::new(),
        };

        let reasoning = text(obj, "reasoning").unwrap_or_default();

        Ok(ValidatedSignal {
            trade,
            action,
            confidence,
            strategy_type: text(obj, "strategyType")
                .unwrap_or_else(|| DEFAULT_STRATEGY_TYPE.to_string()),
            strategy_description: text(obj, "strategyDescription")
                .unwrap_or_else(|| reasoning.clone()),
            macro_implication: text(obj, "macroImplication").unwrap_or_else(|| reasoning.clone()),
            risk_level: text(obj, "riskLevel")
                .and_then(|r| RiskLevel::parse(&r))
                .unwrap_or(DEFAULT_RISK_LEVEL),
            target_return: text(obj, "targetReturn")
                .unwrap_or_else(|| DEFAULT_TARGET_RETURN.to_string()),
            reasoning,
            defi_actions,
        })
    }

    /// Strict schema rejects the signal on the first bad entry; basic
    /// schema drops bad entries.
    fn parse_actions(&self, items: &[Value]) -> Result<Vec<DefiAction>, InvalidSignal> {
        let mut actions = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match parse_action(item) {
                Ok(action) => actions.push(action),
                Err(reason) if self.schema == SchemaVersion::Strict => {
                    return Err(InvalidSignal::InvalidDefiAction { index, reason });
                }
                Err(_) => {}
            }
        }
        Ok(actions)
    }
}

/// Non-empty string field; missing, null, empty or wrong-typed all read as absent
fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_action(item: &Value) -> Result<DefiAction, String> {
    let obj = item.as_object().ok_or("entry is not an object")?;

    let protocol = text(obj, "protocol").ok_or("`protocol` must be a string")?;
    let action_type = text(obj, "actionType")
        .map(|s| ActionKind::parse(&s))
        .ok_or("`actionType` must be a string")?;

    // Models sometimes emit a bare number for allocation
    let allocation = match obj.get("allocation") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err("`allocation` must be a string".to_string()),
    };

    let timing_raw = text(obj, "timing").ok_or("`timing` must be a string")?;
    let timing =
        Timing::parse(&timing_raw).ok_or_else(|| format!("unknown timing {:?}", timing_raw))?;

    let priority = obj
        .get("priority")
        .and_then(as_whole_number)
        .ok_or("`priority` must be a non-negative integer")?;

    Ok(DefiAction {
        protocol,
        action_type,
        from_asset: text(obj, "fromAsset"),
        to_asset: text(obj, "toAsset"),
        allocation,
        timing,
        trigger_condition: text(obj, "triggerCondition"),
        priority,
    })
}

/// Accept `2` and `2.0`, reject `2.5` and negatives
fn as_whole_number(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let f = value.as_f64()?;
    if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}
