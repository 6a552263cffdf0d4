//! Access tier engine
//!
//! Maps a holder's EDGE token balance to a discrete tier and computes when a
//! published strategy becomes visible to that tier. Everything here is pure
//! so the same answer can be produced off-chain (for the dashboard) and
//! on-chain (the StrategyDAO contract). The contract stays authoritative:
//! off-chain results are tagged [`AccessSource::Estimate`].

use crate::config::ConfigError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// EDGE token decimals
pub const TOKEN_DECIMALS: u32 = 18;

/// Discrete access level, 1 = highest privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tier {
    Whale = 1,
    Dolphin = 2,
    Shrimp = 3,
    Public = 4,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Whale, Tier::Dolphin, Tier::Shrimp, Tier::Public];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Tier::Whale),
            2 => Some(Tier::Dolphin),
            3 => Some(Tier::Shrimp),
            4 => Some(Tier::Public),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Whale => "Whale",
            Tier::Dolphin => "Dolphin",
            Tier::Shrimp => "Shrimp",
            Tier::Public => "Public",
        }
    }

    /// Hours between publish and unlock for this tier
    pub fn delay_hours(&self) -> i64 {
        match self {
            Tier::Whale => 0,
            Tier::Dolphin => 24,
            Tier::Shrimp => 48,
            Tier::Public => 72,
        }
    }

    pub fn unlock_delay(&self) -> TimeDelta {
        TimeDelta::hours(self.delay_hours())
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.number()
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Tier::from_number(n).ok_or_else(|| format!("Unknown tier: {}", n))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tier {} ({})", self.number(), self.label())
    }
}

/// When an item published at `published_at` unlocks for `tier`
pub fn unlock_time(published_at: DateTime<Utc>, tier: Tier) -> DateTime<Utc> {
    published_at + tier.unlock_delay()
}

/// Whether an item published at `published_at` is visible to `tier` at `now`
pub fn is_unlocked(published_at: DateTime<Utc>, tier: Tier, now: DateTime<Utc>) -> bool {
    now >= unlock_time(published_at, tier)
}

/// Minimum balances (in token base units) for the three privileged tiers
///
/// Invariant: `whale > dolphin > shrimp > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierThresholds {
    whale: u128,
    dolphin: u128,
    shrimp: u128,
}

impl TierThresholds {
    /// Build thresholds from raw base-unit balances
    pub fn new(whale: u128, dolphin: u128, shrimp: u128) -> Result<Self, ConfigError> {
        if !(whale > dolphin && dolphin > shrimp && shrimp > 0) {
            return Err(ConfigError::InvalidThresholds(format!(
                "expected whale > dolphin > shrimp > 0, got {} / {} / {}",
                whale, dolphin, shrimp
            )));
        }

        Ok(Self {
            whale,
            dolphin,
            shrimp,
        })
    }

    /// Build thresholds from whole-token amounts (18 decimals)
    pub fn from_whole_tokens(whale: u64, dolphin: u64, shrimp: u64) -> Result<Self, ConfigError> {
        let unit = 10u128.pow(TOKEN_DECIMALS);
        // u64::MAX * 10^18 fits in u128, so the multiplications cannot overflow
        Self::new(
            u128::from(whale) * unit,
            u128::from(dolphin) * unit,
            u128::from(shrimp) * unit,
        )
    }

    pub fn whale(&self) -> u128 {
        self.whale
    }

    pub fn dolphin(&self) -> u128 {
        self.dolphin
    }

    pub fn shrimp(&self) -> u128 {
        self.shrimp
    }

    /// Tier for a balance, evaluated from the highest tier down
    pub fn tier_of(&self, balance: u128) -> Tier {
        if balance >= self.whale {
            Tier::Whale
        } else if balance >= self.dolphin {
            Tier::Dolphin
        } else if balance >= self.shrimp {
            Tier::Shrimp
        } else {
            Tier::Public
        }
    }

    pub fn tier_info(&self, balance: u128) -> TierInfo {
        TierInfo {
            balance: Some(balance),
            tier: self.tier_of(balance),
        }
    }
}

impl Default for TierThresholds {
    /// 10,000 / 1,000 / 100 EDGE
    fn default() -> Self {
        let unit = 10u128.pow(TOKEN_DECIMALS);
        Self {
            whale: 10_000 * unit,
            dolphin: 1_000 * unit,
            shrimp: 100 * unit,
        }
    }
}

/// Serialize a u128 as a decimal string; JSON numbers lose precision past 2^53
fn serialize_u128_as_decimal<S>(value: &Option<u128>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => serializer.serialize_str(&value.to_string()),
        None => serializer.serialize_none(),
    }
}

/// A holder's balance and the tier it maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierInfo {
    /// Base units. `None` when the tier came from the contract and no
    /// balance could be read alongside it
    #[serde(
        serialize_with = "serialize_u128_as_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub balance: Option<u128>,
    pub tier: Tier,
}

impl TierInfo {
    /// Tier reported without a balance to back it
    pub fn without_balance(tier: Tier) -> Self {
        Self {
            balance: None,
            tier,
        }
    }

    /// Balance in whole tokens, rounded down
    pub fn whole_tokens(&self) -> Option<u128> {
        self.balance.map(|balance| balance / 10u128.pow(TOKEN_DECIMALS))
    }
}

/// Where an access answer came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessSource {
    /// Computed locally from the tier table; advisory only
    Estimate,
    /// Read from the StrategyDAO contract
    OnChain,
}

/// Visibility of one published item for one holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessView {
    pub unlocked: bool,
    pub unlock_at: DateTime<Utc>,
    pub source: AccessSource,
}

impl AccessView {
    /// Local prediction from the tier table
    pub fn estimate(published_at: DateTime<Utc>, tier: Tier, now: DateTime<Utc>) -> Self {
        Self {
            unlocked: is_unlocked(published_at, tier, now),
            unlock_at: unlock_time(published_at, tier),
            source: AccessSource::Estimate,
        }
    }

    /// Answer reported by the contract
    pub fn on_chain(can_access: bool, unlock_at: DateTime<Utc>) -> Self {
        Self {
            unlocked: can_access,
            unlock_at,
            source: AccessSource::OnChain,
        }
    }

    /// Seconds until unlock, zero once unlocked
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> i64 {
        if self.unlocked {
            return 0;
        }
        (self.unlock_at - now).num_seconds().max(0)
    }
}
