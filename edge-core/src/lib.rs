//! Core types for the CrowdEdge signal agent
//!
//! This crate defines the shared data structures used across the agent:
//! market snapshots, validated signals, published strategies, the access
//! tier engine and the startup configuration.

pub mod access;
pub mod config;
pub mod error;
pub mod market;
pub mod published;
pub mod signal;

pub use access::{AccessSource, AccessView, Tier, TierInfo, TierThresholds, TOKEN_DECIMALS};
pub use config::{AgentConfig, ClassifierConfig, ConfigError, LedgerConfig};
pub use error::{EdgeError, EdgeResult};
pub use market::MarketRecord;
pub use published::{PublishRequest, PublishedItem};
pub use signal::{
    ActionKind, AnalyzedMarket, DefiAction, Direction, RiskLevel, Timing, ValidatedSignal,
};
