//! StrategyDAO and EDGE token bindings

use crate::types::{u256_to_u64, LedgerError, Result};
use alloy::sol;
use chrono::DateTime;
use edge_core::PublishedItem;

// ============================================================================
// Contract interfaces
// ============================================================================

sol! {
    #[sol(rpc, all_derives)]
    interface IStrategyDao {
        struct Strategy {
            uint256 id;
            string marketSlug;
            string question;
            string signal;
            uint256 probability;
            uint256 confidence;
            string strategyType;
            string description;
            uint256 publishedAt;
            bool active;
        }

        function addStrategy(
            string _marketSlug,
            string _question,
            string _signal,
            uint256 _probability,
            uint256 _confidence,
            string _strategyType,
            string _description
        ) external returns (uint256);

        function getStrategyCount() external view returns (uint256);

        function getLatestStrategies(uint256 count) external view returns (Strategy[] memory);

        function getTier(address user) external view returns (uint8);

        function canAccess(uint256 strategyId, address user) external view returns (bool);

        function getUnlockTime(uint256 strategyId, address user) external view returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    interface IEdgeToken {
        function balanceOf(address account) external view returns (uint256);
    }
}

impl TryFrom<IStrategyDao::Strategy> for PublishedItem {
    type Error = LedgerError;

    fn try_from(s: IStrategyDao::Strategy) -> Result<Self> {
        let published_secs = i64::try_from(u256_to_u64(s.publishedAt))
            .map_err(|_| LedgerError::Contract(format!("publishedAt out of range for {}", s.id)))?;
        let published_at = DateTime::from_timestamp(published_secs, 0)
            .ok_or_else(|| LedgerError::Contract(format!("Invalid publishedAt for {}", s.id)))?;

        Ok(PublishedItem {
            id: u256_to_u64(s.id),
            market_slug: s.marketSlug,
            question: s.question,
            signal: s.signal,
            probability: u256_to_u64(s.probability),
            confidence: u256_to_u64(s.confidence),
            strategy_type: s.strategyType,
            description: s.description,
            published_at,
            active: s.active,
        })
    }
}
