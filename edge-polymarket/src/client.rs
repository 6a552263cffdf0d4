//! Gamma API client

use crate::source::MarketSource;
use crate::types::GammaMarket;
use async_trait::async_trait;
use edge_core::{EdgeError, EdgeResult, MarketRecord};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Requests that take longer are treated as a failed fetch
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Polymarket Gamma API client
#[derive(Clone)]
pub struct GammaClient {
    client: Client,
    base_url: String,
}

impl GammaClient {
    pub fn new(base_url: impl Into<String>) -> EdgeResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EdgeError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn markets_url(&self, limit: u32) -> String {
        let params = [
            format!("limit={}", limit),
            "active=true".to_string(),
            "closed=false".to_string(),
            "order=volume24hr".to_string(),
            "ascending=false".to_string(),
        ];
        format!("{}/markets?{}", self.base_url, params.join("&"))
    }

    /// List open markets ordered by 24h volume
    ///
    /// Records that fail to deserialize are skipped individually so one bad
    /// entry does not cost the whole page.
    #[instrument(skip(self))]
    pub async fn list_markets(&self, limit: u32) -> EdgeResult<Vec<MarketRecord>> {
        let url = self.markets_url(limit);
        debug!("Fetching Polymarket markets from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EdgeError::network(format!("Failed to fetch markets: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EdgeError::api(format!(
                "Polymarket API error ({}): {}",
                status, body
            )));
        }

        let raw: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| EdgeError::parse(format!("Failed to parse markets response: {}", e)))?;

        Ok(parse_markets(raw))
    }
}

fn parse_markets(raw: Vec<serde_json::Value>) -> Vec<MarketRecord> {
    let total = raw.len();
    let markets: Vec<MarketRecord> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<GammaMarket>(value) {
            Ok(market) => Some(market.into_record()),
            Err(e) => {
                warn!("Skipping malformed market record: {}", e);
                None
            }
        })
        .collect();

    debug!("Parsed {}/{} market records", markets.len(), total);
    markets
}

#[async_trait]
impl MarketSource for GammaClient {
    async fn fetch_markets(&self, limit: u32) -> EdgeResult<Vec<MarketRecord>> {
        self.list_markets(limit).await
    }
}
