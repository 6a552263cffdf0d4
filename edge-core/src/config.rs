//! Agent configuration
//!
//! Built once at startup and handed to each component. Nothing below the
//! binary reads the process environment directly.

use crate::access::TierThresholds;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_POLYMARKET_API_URL: &str = "https://gamma-api.polymarket.com";
pub const DEFAULT_LLM_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MONAD_RPC_URL: &str = "https://testnet-rpc.monad.xyz";
pub const DEFAULT_EXPLORER_TX_URL: &str = "https://testnet.monadexplorer.com/tx/";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("Invalid tier thresholds: {0}")]
    InvalidThresholds(String),
}

/// Language-model endpoint and validation settings
#[derive(Clone)]
pub struct ClassifierConfig {
    /// OpenAI-compatible base URL
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// Require `defiActions` in every signal
    pub strict_schema: bool,
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("strict_schema", &self.strict_schema)
            .field("batch_size", &self.batch_size)
            .field("batch_delay", &self.batch_delay)
            .finish()
    }
}

/// Chain endpoint, contract addresses and signing key
#[derive(Clone)]
pub struct LedgerConfig {
    pub rpc_url: String,
    /// StrategyDAO contract address, `0x`-prefixed hex
    pub strategy_dao: String,
    /// EDGE token address; tier reads use the DAO's `getTier` when absent
    pub edge_token: Option<String>,
    /// Hex private key, with or without `0x`
    pub private_key: String,
    pub explorer_tx_url: String,
}

impl fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("rpc_url", &self.rpc_url)
            .field("strategy_dao", &self.strategy_dao)
            .field("edge_token", &self.edge_token)
            .field("private_key", &"<redacted>")
            .field("explorer_tx_url", &self.explorer_tx_url)
            .finish()
    }
}

/// Complete agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub polymarket_api_url: String,
    pub classifier: ClassifierConfig,
    pub ledger: LedgerConfig,
    /// Minimum confidence for a signal to be published
    pub confidence_threshold: f64,
    /// Signals published per cycle
    pub top_n: usize,
    pub cycle_interval: Duration,
    /// Markets requested from the data source per cycle
    pub fetch_limit: u32,
    /// Filtered markets classified per cycle
    pub analyze_limit: usize,
    pub exclude_unpriced_markets: bool,
    pub tier_thresholds: TierThresholds,
    pub tier_cache_ttl: Duration,
    pub server_port: u16,
}

impl AgentConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("LLM_API_KEY")
            .or_else(|| get("GROQ_API_KEY"))
            .ok_or(ConfigError::Missing("LLM_API_KEY"))?;

        let strategy_dao = get("STRATEGY_DAO").ok_or(ConfigError::Missing("STRATEGY_DAO"))?;
        check_address("STRATEGY_DAO", &strategy_dao)?;

        let edge_token = get("EDGE_TOKEN");
        if let Some(token) = &edge_token {
            check_address("EDGE_TOKEN", token)?;
        }

        let private_key = get("PRIVATE_KEY").ok_or(ConfigError::Missing("PRIVATE_KEY"))?;

        let confidence_threshold: f64 = parse_or(&get, "CONFIDENCE_THRESHOLD", 65.0)?;
        if !(0.0..=100.0).contains(&confidence_threshold) {
            return Err(ConfigError::Invalid {
                var: "CONFIDENCE_THRESHOLD",
                reason: format!("{} is outside 0-100", confidence_threshold),
            });
        }

        let batch_size: usize = parse_or(&get, "CLASSIFY_BATCH_SIZE", 5)?;
        if batch_size == 0 {
            return Err(ConfigError::Invalid {
                var: "CLASSIFY_BATCH_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }

        let cycle_secs: u64 = parse_or(&get, "CYCLE_INTERVAL_SECS", 300)?;
        if cycle_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "CYCLE_INTERVAL_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        let tier_thresholds = match get("TIER_THRESHOLDS") {
            Some(raw) => parse_thresholds(&raw)?,
            None => TierThresholds::default(),
        };

        Ok(Self {
            polymarket_api_url: get("POLYMARKET_API_URL")
                .unwrap_or_else(|| DEFAULT_POLYMARKET_API_URL.to_string()),
            classifier: ClassifierConfig {
                api_base: get("LLM_API_BASE").unwrap_or_else(|| DEFAULT_LLM_API_BASE.to_string()),
                api_key,
                model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                temperature: 0.3,
                strict_schema: parse_or(&get, "STRICT_SIGNAL_SCHEMA", true)?,
                batch_size,
                batch_delay: Duration::from_millis(parse_or(&get, "CLASSIFY_BATCH_DELAY_MS", 500)?),
            },
            ledger: LedgerConfig {
                rpc_url: get("MONAD_RPC_URL").unwrap_or_else(|| DEFAULT_MONAD_RPC_URL.to_string()),
                strategy_dao,
                edge_token,
                private_key,
                explorer_tx_url: DEFAULT_EXPLORER_TX_URL.to_string(),
            },
            confidence_threshold,
            top_n: parse_or(&get, "TOP_N", 3)?,
            cycle_interval: Duration::from_secs(cycle_secs),
            fetch_limit: parse_or(&get, "FETCH_LIMIT", 100)?,
            analyze_limit: parse_or(&get, "ANALYZE_LIMIT", 20)?,
            exclude_unpriced_markets: parse_or(&get, "EXCLUDE_UNPRICED_MARKETS", false)?,
            tier_thresholds,
            tier_cache_ttl: Duration::from_secs(parse_or(&get, "TIER_CACHE_TTL_SECS", 30)?),
            server_port: parse_or(&get, "SERVER_PORT", 3001)?,
        })
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("{:?}: {}", raw, e),
        }),
        None => Ok(default),
    }
}

fn check_address(var: &'static str, value: &str) -> Result<(), ConfigError> {
    let hex = value.strip_prefix("0x").unwrap_or("");
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::Invalid {
            var,
            reason: format!("{:?} is not a 0x-prefixed 20-byte address", value),
        });
    }
    Ok(())
}

/// Parse `"whale,dolphin,shrimp"` in whole tokens
fn parse_thresholds(raw: &str) -> Result<TierThresholds, ConfigError> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigError::Invalid {
            var: "TIER_THRESHOLDS",
            reason: e.to_string(),
        })?;

    match parts.as_slice() {
        [whale, dolphin, shrimp] => TierThresholds::from_whole_tokens(*whale, *dolphin, *shrimp),
        _ => Err(ConfigError::Invalid {
            var: "TIER_THRESHOLDS",
            reason: format!("expected three comma-separated values, got {}", parts.len()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const DAO: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn load(vars: &[(&str, &str)]) -> Result<AgentConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AgentConfig::from_lookup(|key| map.get(key).cloned())
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![("LLM_API_KEY", "gsk_test"), ("STRATEGY_DAO", DAO), ("PRIVATE_KEY", KEY)]
    }

    #[test]
    fn test_defaults() {
        let config = load(&required()).unwrap();
        assert_eq!(config.polymarket_api_url, DEFAULT_POLYMARKET_API_URL);
        assert_eq!(config.classifier.model, DEFAULT_LLM_MODEL);
        assert_eq!(config.classifier.batch_size, 5);
        assert_eq!(config.classifier.batch_delay, Duration::from_millis(500));
        assert!(config.classifier.strict_schema);
        assert_eq!(config.confidence_threshold, 65.0);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.cycle_interval, Duration::from_secs(300));
        assert_eq!(config.fetch_limit, 100);
        assert_eq!(config.analyze_limit, 20);
        assert!(!config.exclude_unpriced_markets);
        assert_eq!(config.tier_thresholds, TierThresholds::default());
        assert_eq!(config.server_port, 3001);
        assert!(config.ledger.edge_token.is_none());
    }

    #[test]
    fn test_missing_required() {
        for missing in ["LLM_API_KEY", "STRATEGY_DAO", "PRIVATE_KEY"] {
            let vars: Vec<_> = required().into_iter().filter(|(k, _)| *k != missing).collect();
            match load(&vars) {
                Err(ConfigError::Missing(var)) => assert_eq!(var, missing),
                other => panic!("expected missing {}, got {:?}", missing, other),
            }
        }
    }

    #[test]
    fn test_blank_value_is_missing() {
        let mut vars = required();
        vars.retain(|(k, _)| *k != "STRATEGY_DAO");
        vars.push(("STRATEGY_DAO", "   "));
        assert!(matches!(load(&vars), Err(ConfigError::Missing("STRATEGY_DAO"))));
    }

    #[test]
    fn test_groq_key_fallback() {
        let mut vars = required();
        vars.retain(|(k, _)| *k != "LLM_API_KEY");
        vars.push(("GROQ_API_KEY", "gsk_fallback"));
        assert_eq!(load(&vars).unwrap().classifier.api_key, "gsk_fallback");
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        for (var, value) in [
            ("TOP_N", "three"),
            ("CONFIDENCE_THRESHOLD", "101"),
            ("CLASSIFY_BATCH_SIZE", "0"),
            ("CYCLE_INTERVAL_SECS", "0"),
            ("SERVER_PORT", "70000"),
            ("STRICT_SIGNAL_SCHEMA", "yes"),
        ] {
            let mut vars = required();
            vars.push((var, value));
            assert!(
                matches!(load(&vars), Err(ConfigError::Invalid { .. })),
                "{}={} should be rejected",
                var,
                value
            );
        }
    }

    #[test]
    fn test_bad_address_rejected() {
        let mut vars = required();
        vars.push(("EDGE_TOKEN", "0x1234"));
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { var: "EDGE_TOKEN", .. })));
    }

    #[test]
    fn test_tier_thresholds() {
        let mut vars = required();
        vars.push(("TIER_THRESHOLDS", "500, 50, 5"));
        let config = load(&vars).unwrap();
        assert_eq!(config.tier_thresholds.shrimp(), 5 * 10u128.pow(18));

        let mut vars = required();
        vars.push(("TIER_THRESHOLDS", "50,500,5"));
        assert!(matches!(load(&vars), Err(ConfigError::InvalidThresholds(_))));

        let mut vars = required();
        vars.push(("TIER_THRESHOLDS", "500,50"));
        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = load(&required()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("gsk_test"));
        assert!(!debug.contains("ac0974bec"));
    }
}
