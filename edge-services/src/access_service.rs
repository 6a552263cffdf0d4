//! Holder tiers and the access-gated strategy feed
//!
//! The contract answers are authoritative. When a contract read fails the
//! service falls back to the local tier table and tags the answer as an
//! estimate instead of failing the whole request.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use edge_core::{AccessSource, AccessView, PublishedItem, Tier, TierInfo, TierThresholds};
use edge_ledger::{Address, LedgerError, LedgerReader, Result};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A holder's tier as shown on the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct HolderTier {
    pub holder: String,
    #[serde(flatten)]
    pub info: TierInfo,
    pub label: &'static str,
    pub delay_hours: i64,
    pub source: AccessSource,
}

impl HolderTier {
    fn new(holder: Address, info: TierInfo, source: AccessSource) -> Self {
        Self {
            holder: holder.to_string(),
            label: info.tier.label(),
            delay_hours: info.tier.delay_hours(),
            info,
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    /// Nothing has been published yet
    WarmingUp,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ItemAccess {
    ConnectWallet,
    Unlocked {
        unlock_at: DateTime<Utc>,
        source: AccessSource,
    },
    Locked {
        unlock_at: DateTime<Utc>,
        seconds_remaining: i64,
        source: AccessSource,
    },
}

impl ItemAccess {
    fn from_view(view: AccessView, now: DateTime<Utc>) -> Self {
        if view.unlocked {
            ItemAccess::Unlocked {
                unlock_at: view.unlock_at,
                source: view.source,
            }
        } else {
            ItemAccess::Locked {
                unlock_at: view.unlock_at,
                seconds_remaining: view.seconds_remaining(now),
                source: view.source,
            }
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, ItemAccess::Unlocked { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub id: u64,
    pub market_slug: String,
    pub question: String,
    pub signal: String,
    pub probability: u64,
    pub confidence: u64,
    pub strategy_type: String,
    /// Withheld unless the item is unlocked for the holder
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub active: bool,
    pub access: ItemAccess,
}

impl FeedItem {
    fn new(item: PublishedItem, access: ItemAccess) -> Self {
        let description = access.is_unlocked().then_some(item.description);
        Self {
            id: item.id,
            market_slug: item.market_slug,
            question: item.question,
            signal: item.signal,
            probability: item.probability,
            confidence: item.confidence,
            strategy_type: item.strategy_type,
            description,
            published_at: item.published_at,
            active: item.active,
            access,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyFeed {
    pub status: FeedStatus,
    pub total: u64,
    pub tier: Option<HolderTier>,
    /// Newest first
    pub items: Vec<FeedItem>,
}

pub struct AccessService {
    reader: Arc<dyn LedgerReader>,
    thresholds: TierThresholds,
    cache: DashMap<Address, (HolderTier, Instant)>,
    ttl: Duration,
}

impl AccessService {
    pub fn new(reader: Arc<dyn LedgerReader>, thresholds: TierThresholds, ttl: Duration) -> Self {
        Self {
            reader,
            thresholds,
            cache: DashMap::new(),
            ttl,
        }
    }

    pub async fn total_published(&self) -> Result<u64> {
        self.reader.strategy_count().await
    }

    /// Tier for `holder`, served from cache for `ttl`
    ///
    /// Expired entries are dropped on lookup and swept on every insert, so
    /// the cache only holds holders seen within the last `ttl`.
    pub async fn tier_of(&self, holder: Address) -> Result<HolderTier> {
        let cached = self.cache.get(&holder).map(|entry| entry.value().clone());
        if let Some((tier, fetched_at)) = cached {
            if fetched_at.elapsed() < self.ttl {
                return Ok(tier);
            }
            self.cache
                .remove_if(&holder, |_, (_, at)| at.elapsed() >= self.ttl);
        }

        let tier = self.fetch_tier(holder).await?;
        if !self.ttl.is_zero() {
            self.cache.retain(|_, (_, at)| at.elapsed() < self.ttl);
            self.cache.insert(holder, (tier.clone(), Instant::now()));
        }
        Ok(tier)
    }

    /// Holders currently cached
    pub fn cached_holders(&self) -> usize {
        self.cache.len()
    }

    async fn fetch_tier(&self, holder: Address) -> Result<HolderTier> {
        let balance = match self.reader.token_balance(holder).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!(%holder, "Token balance read failed: {}", e);
                None
            }
        };

        let on_chain = match self.reader.tier_number(holder).await {
            Ok(n) => Tier::from_number(n).or_else(|| {
                warn!(%holder, "Contract returned unknown tier {}", n);
                None
            }),
            Err(e) => {
                warn!(%holder, "Tier read failed: {}", e);
                None
            }
        };

        match (on_chain, balance) {
            (Some(tier), balance) => Ok(HolderTier::new(
                holder,
                TierInfo { balance, tier },
                AccessSource::OnChain,
            )),
            (None, Some(balance)) => {
                debug!(%holder, "Estimating tier from balance");
                Ok(HolderTier::new(
                    holder,
                    self.thresholds.tier_info(balance),
                    AccessSource::Estimate,
                ))
            }
            (None, None) => Err(LedgerError::Rpc(format!(
                "No tier or balance available for {}",
                holder
            ))),
        }
    }

    /// Latest `limit` strategies with per-item access for `holder`
    pub async fn feed(
        &self,
        holder: Option<Address>,
        limit: u64,
        now: DateTime<Utc>,
    ) -> Result<StrategyFeed> {
        let total = self.reader.strategy_count().await?;
        if total == 0 || limit == 0 {
            return Ok(StrategyFeed {
                status: if total == 0 {
                    FeedStatus::WarmingUp
                } else {
                    FeedStatus::Ready
                },
                total,
                tier: None,
                items: Vec::new(),
            });
        }

        let mut items = self.reader.latest_strategies(limit.min(total)).await?;
        items.sort_by(|a, b| b.id.cmp(&a.id));

        let Some(holder) = holder else {
            let items = items
                .into_iter()
                .map(|item| FeedItem::new(item, ItemAccess::ConnectWallet))
                .collect();
            return Ok(StrategyFeed {
                status: FeedStatus::Ready,
                total,
                tier: None,
                items,
            });
        };

        let tier = match self.tier_of(holder).await {
            Ok(tier) => Some(tier),
            Err(e) => {
                warn!(%holder, "Falling back to public tier: {}", e);
                None
            }
        };
        let fallback_tier = tier.as_ref().map(|t| t.info.tier).unwrap_or(Tier::Public);

        let views = join_all(
            items
                .iter()
                .map(|item| self.item_access(item, holder, fallback_tier, now)),
        )
        .await;

        let items = items
            .into_iter()
            .zip(views)
            .map(|(item, view)| FeedItem::new(item, ItemAccess::from_view(view, now)))
            .collect();

        Ok(StrategyFeed {
            status: FeedStatus::Ready,
            total,
            tier,
            items,
        })
    }

    async fn item_access(
        &self,
        item: &PublishedItem,
        holder: Address,
        tier: Tier,
        now: DateTime<Utc>,
    ) -> AccessView {
        match self.reader.access(item.id, holder).await {
            Ok((can_access, unlock_at)) => AccessView::on_chain(can_access, unlock_at),
            Err(e) => {
                warn!(%holder, id = item.id, "Access read failed, estimating: {}", e);
                AccessView::estimate(item.published_at, tier, now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeDelta, TimeZone};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const EDGE: u128 = 1_000_000_000_000_000_000;

    fn published_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn item(id: u64) -> PublishedItem {
        PublishedItem {
            id,
            market_slug: format!("market-{}", id),
            question: "Will it happen?".to_string(),
            signal: "YES".to_string(),
            probability: 72,
            confidence: 80,
            strategy_type: "RISK_ON".to_string(),
            description: "Rotate into ETH".to_string(),
            published_at: published_at(),
            active: true,
        }
    }

    /// Mirrors the contract: tier from balance, access after the tier delay
    struct FakeReader {
        items: Vec<PublishedItem>,
        balance: u128,
        token_configured: bool,
        tier_fails: bool,
        access_fails: bool,
        tier_calls: AtomicUsize,
        now: DateTime<Utc>,
    }

    impl FakeReader {
        fn new(items: Vec<PublishedItem>, balance: u128) -> Self {
            Self {
                items,
                balance,
                token_configured: true,
                tier_fails: false,
                access_fails: false,
                tier_calls: AtomicUsize::new(0),
                now: published_at() + TimeDelta::hours(30),
            }
        }
    }

    #[async_trait]
    impl LedgerReader for FakeReader {
        async fn strategy_count(&self) -> Result<u64> {
            Ok(self.items.len() as u64)
        }

        async fn latest_strategies(&self, count: u64) -> Result<Vec<PublishedItem>> {
            let skip = self.items.len().saturating_sub(count as usize);
            Ok(self.items[skip..].to_vec())
        }

        async fn tier_number(&self, _holder: Address) -> Result<u8> {
            self.tier_calls.fetch_add(1, Ordering::SeqCst);
            if self.tier_fails {
                return Err(LedgerError::Rpc("down".to_string()));
            }
            Ok(TierThresholds::default().tier_of(self.balance).number())
        }

        async fn token_balance(&self, _holder: Address) -> Result<Option<u128>> {
            Ok(self.token_configured.then_some(self.balance))
        }

        async fn access(&self, id: u64, _holder: Address) -> Result<(bool, DateTime<Utc>)> {
            if self.access_fails {
                return Err(LedgerError::Contract("reverted".to_string()));
            }
            let item = &self.items[id as usize - 1];
            let tier = TierThresholds::default().tier_of(self.balance);
            let unlock = edge_core::access::unlock_time(item.published_at, tier);
            Ok((self.now >= unlock, unlock))
        }
    }

    fn service(reader: FakeReader) -> (Arc<FakeReader>, AccessService) {
        let reader = Arc::new(reader);
        let service = AccessService::new(
            reader.clone(),
            TierThresholds::default(),
            Duration::from_secs(30),
        );
        (reader, service)
    }

    fn holder() -> Address {
        Address::repeat_byte(0x11)
    }

    #[tokio::test]
    async fn test_empty_feed_is_warming_up() {
        let (_, service) = service(FakeReader::new(Vec::new(), 0));
        let feed = service.feed(Some(holder()), 20, Utc::now()).await.unwrap();
        assert_eq!(feed.status, FeedStatus::WarmingUp);
        assert!(feed.items.is_empty());
    }

    #[tokio::test]
    async fn test_feed_without_holder_asks_for_wallet() {
        let (_, service) = service(FakeReader::new(vec![item(1), item(2)], 0));
        let feed = service.feed(None, 20, Utc::now()).await.unwrap();

        assert_eq!(feed.status, FeedStatus::Ready);
        assert_eq!(feed.items[0].id, 2);
        assert!(feed
            .items
            .iter()
            .all(|i| i.access == ItemAccess::ConnectWallet && i.description.is_none()));
    }

    #[tokio::test]
    async fn test_dolphin_sees_item_after_a_day() {
        let reader = FakeReader::new(vec![item(1)], 5_000 * EDGE);
        let now = reader.now;
        let (_, service) = service(reader);

        let feed = service.feed(Some(holder()), 20, now).await.unwrap();
        let tier = feed.tier.unwrap();
        assert_eq!(tier.info.tier, Tier::Dolphin);
        assert_eq!(tier.info.balance, Some(5_000 * EDGE));
        assert_eq!(tier.source, AccessSource::OnChain);

        let first = &feed.items[0];
        assert_eq!(first.description.as_deref(), Some("Rotate into ETH"));
        assert!(matches!(
            first.access,
            ItemAccess::Unlocked {
                source: AccessSource::OnChain,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_locked_item_falls_back_to_estimate() {
        let mut reader = FakeReader::new(vec![item(1)], 0);
        reader.access_fails = true;
        reader.tier_fails = true;
        let now = reader.now;
        let (_, service) = service(reader);

        let feed = service.feed(Some(holder()), 20, now).await.unwrap();
        assert_eq!(feed.tier.as_ref().unwrap().source, AccessSource::Estimate);

        let first = &feed.items[0];
        assert!(first.description.is_none());
        assert_eq!(
            first.access,
            ItemAccess::Locked {
                unlock_at: published_at() + TimeDelta::hours(72),
                seconds_remaining: 42 * 3600,
                source: AccessSource::Estimate,
            }
        );
    }

    #[tokio::test]
    async fn test_feed_respects_limit() {
        let items = (1..=5).map(item).collect();
        let (_, service) = service(FakeReader::new(items, 20_000 * EDGE));
        let feed = service.feed(None, 2, Utc::now()).await.unwrap();

        assert_eq!(feed.total, 5);
        let ids: Vec<_> = feed.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![5, 4]);
    }

    #[tokio::test]
    async fn test_tier_is_cached() {
        let (reader, service) = service(FakeReader::new(Vec::new(), 150 * EDGE));

        let first = service.tier_of(holder()).await.unwrap();
        let second = service.tier_of(holder()).await.unwrap();

        assert_eq!(first.info.tier, Tier::Shrimp);
        assert_eq!(second.label, "Shrimp");
        assert_eq!(second.delay_hours, 48);
        assert_eq!(reader.tier_calls.load(Ordering::SeqCst), 1);
    }

    fn holder_n(n: u32) -> Address {
        let mut bytes = [0u8; 20];
        bytes[16..].copy_from_slice(&n.to_be_bytes());
        Address::from(bytes)
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_tiers_are_evicted() {
        let (_, service) = service(FakeReader::new(Vec::new(), 150 * EDGE));

        for n in 0..500 {
            service.tier_of(holder_n(n)).await.unwrap();
        }
        assert_eq!(service.cached_holders(), 500);

        tokio::time::advance(Duration::from_secs(3600)).await;
        service.tier_of(holder_n(10_000)).await.unwrap();
        assert_eq!(service.cached_holders(), 1);

        // A stale hit is refetched and replaces its own entry
        tokio::time::advance(Duration::from_secs(31)).await;
        service.tier_of(holder_n(10_000)).await.unwrap();
        assert_eq!(service.cached_holders(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_tiers_survive_the_sweep() {
        let (reader, service) = service(FakeReader::new(Vec::new(), 150 * EDGE));

        service.tier_of(holder_n(1)).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        service.tier_of(holder_n(2)).await.unwrap();
        service.tier_of(holder_n(1)).await.unwrap();

        assert_eq!(service.cached_holders(), 2);
        assert_eq!(reader.tier_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_balance_is_left_out() {
        let mut reader = FakeReader::new(Vec::new(), 20_000 * EDGE);
        reader.token_configured = false;
        let (_, service) = service(reader);

        let tier = service.tier_of(holder()).await.unwrap();
        assert_eq!(tier.info.tier, Tier::Whale);
        assert_eq!(tier.source, AccessSource::OnChain);
        assert_eq!(tier.info.balance, None);

        let json = serde_json::to_value(&tier).unwrap();
        assert!(json.get("balance").is_none());
        assert_eq!(json["tier"], 1);
    }

    #[tokio::test]
    async fn test_known_balance_is_a_decimal_string() {
        let (_, service) = service(FakeReader::new(Vec::new(), 150 * EDGE));

        let json = serde_json::to_value(service.tier_of(holder()).await.unwrap()).unwrap();
        assert_eq!(json["balance"], "150000000000000000000");
        assert_eq!(json["label"], "Shrimp");
    }

    #[test]
    fn test_item_access_serialization() {
        let access = ItemAccess::Locked {
            unlock_at: published_at(),
            seconds_remaining: 60,
            source: AccessSource::Estimate,
        };
        let json = serde_json::to_value(&access).unwrap();
        assert_eq!(json["state"], "locked");
        assert_eq!(json["seconds_remaining"], 60);
        assert_eq!(json["source"], "estimate");

        let json = serde_json::to_value(ItemAccess::ConnectWallet).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "connect_wallet" }));
    }
}
