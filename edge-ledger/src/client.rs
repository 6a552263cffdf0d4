//! StrategyDAO client on Monad

use crate::contract::{IEdgeToken, IStrategyDao};
use crate::ledger::{LedgerReader, LedgerWriter, PublishReceipt};
use crate::types::{u256_to_u128, u256_to_u64, LedgerError, Result, MONAD_TESTNET_CHAIN_ID};
use crate::wallet::LedgerWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use edge_core::{LedgerConfig, PublishRequest, PublishedItem};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

pub fn parse_address(var: &str, value: &str) -> Result<Address> {
    Address::from_str(value.trim())
        .map_err(|e| LedgerError::Config(format!("Invalid {} address {:?}: {}", var, value, e)))
}

/// Convert stored strategies, skipping any that cannot be represented
fn decode_strategies(strategies: Vec<IStrategyDao::Strategy>) -> Vec<PublishedItem> {
    let total = strategies.len();
    let items: Vec<PublishedItem> = strategies
        .into_iter()
        .filter_map(|strategy| match PublishedItem::try_from(strategy) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping unreadable strategy: {}", e);
                None
            }
        })
        .collect();

    debug!("Decoded {}/{} strategies", items.len(), total);
    items
}

/// Reads and writes the StrategyDAO contract with the agent's key
#[derive(Clone)]
pub struct MonadLedger {
    provider: DynProvider,
    wallet: LedgerWallet,
    dao: IStrategyDao::IStrategyDaoInstance<DynProvider>,
    token: Option<IEdgeToken::IEdgeTokenInstance<DynProvider>>,
}

impl MonadLedger {
    pub fn new(config: &LedgerConfig) -> Result<Self> {
        let wallet = LedgerWallet::from_private_key(&config.private_key)?;
        let url = Url::parse(&config.rpc_url)
            .map_err(|e| LedgerError::Config(format!("Invalid RPC URL {}: {}", config.rpc_url, e)))?;

        let provider = ProviderBuilder::new()
            .wallet(wallet.ethereum_wallet())
            .connect_http(url)
            .erased();

        let dao_address = parse_address("STRATEGY_DAO", &config.strategy_dao)?;
        let dao = IStrategyDao::new(dao_address, provider.clone());

        let token = match &config.edge_token {
            Some(addr) => Some(IEdgeToken::new(
                parse_address("EDGE_TOKEN", addr)?,
                provider.clone(),
            )),
            None => None,
        };

        Ok(Self {
            provider,
            wallet,
            dao,
            token,
        })
    }

    pub fn wallet(&self) -> &LedgerWallet {
        &self.wallet
    }

    pub fn dao_address(&self) -> Address {
        *self.dao.address()
    }

    /// Native balance of the agent wallet, in wei
    #[instrument(skip(self))]
    pub async fn native_balance(&self) -> Result<u128> {
        let balance = self
            .provider
            .get_balance(self.wallet.address())
            .await
            .map_err(|e| LedgerError::Rpc(format!("Failed to fetch balance: {}", e)))?;
        Ok(u256_to_u128(balance))
    }

    /// Log the connected chain, warning when it is not Monad testnet
    pub async fn check_chain(&self) -> Result<u64> {
        let chain_id = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| LedgerError::Rpc(format!("Failed to fetch chain id: {}", e)))?;

        if chain_id == MONAD_TESTNET_CHAIN_ID {
            info!("Connected to Monad testnet (chain {})", chain_id);
        } else {
            warn!(
                "RPC reports chain {}, expected Monad testnet ({})",
                chain_id, MONAD_TESTNET_CHAIN_ID
            );
        }
        Ok(chain_id)
    }
}

#[async_trait]
impl LedgerWriter for MonadLedger {
    #[instrument(skip(self, request), fields(slug = %request.market_slug))]
    async fn publish(&self, request: &PublishRequest) -> Result<PublishReceipt> {
        let call = self.dao.addStrategy(
            request.market_slug.clone(),
            request.question.clone(),
            request.signal.as_str().to_string(),
            U256::from(request.probability),
            U256::from(request.confidence),
            request.strategy_type.clone(),
            request.description.clone(),
        );

        let pending = call
            .send()
            .await
            .map_err(|e| LedgerError::Contract(format!("addStrategy failed: {}", e)))?;

        let tx_hash = pending.tx_hash().to_string();
        debug!("Submitted addStrategy tx {}", tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| LedgerError::Rpc(format!("Failed to confirm {}: {}", tx_hash, e)))?;

        if !receipt.status() {
            return Err(LedgerError::Reverted(tx_hash));
        }

        Ok(PublishReceipt {
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}

#[async_trait]
impl LedgerReader for MonadLedger {
    async fn strategy_count(&self) -> Result<u64> {
        let count = self
            .dao
            .getStrategyCount()
            .call()
            .await
            .map_err(|e| LedgerError::Contract(format!("getStrategyCount failed: {}", e)))?;
        Ok(u256_to_u64(count))
    }

    #[instrument(skip(self))]
    async fn latest_strategies(&self, count: u64) -> Result<Vec<PublishedItem>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        let strategies = self
            .dao
            .getLatestStrategies(U256::from(count))
            .call()
            .await
            .map_err(|e| LedgerError::Contract(format!("getLatestStrategies failed: {}", e)))?;

        Ok(decode_strategies(strategies))
    }

    async fn tier_number(&self, holder: Address) -> Result<u8> {
        self.dao
            .getTier(holder)
            .call()
            .await
            .map_err(|e| LedgerError::Contract(format!("getTier failed: {}", e)))
    }

    async fn token_balance(&self, holder: Address) -> Result<Option<u128>> {
        let Some(token) = &self.token else {
            return Ok(None);
        };

        let balance = token
            .balanceOf(holder)
            .call()
            .await
            .map_err(|e| LedgerError::Contract(format!("balanceOf failed: {}", e)))?;
        Ok(Some(u256_to_u128(balance)))
    }

    async fn access(&self, id: u64, holder: Address) -> Result<(bool, DateTime<Utc>)> {
        let strategy_id = U256::from(id);

        let can_access = self
            .dao
            .canAccess(strategy_id, holder)
            .call()
            .await
            .map_err(|e| LedgerError::Contract(format!("canAccess failed: {}", e)))?;

        let unlock = self
            .dao
            .getUnlockTime(strategy_id, holder)
            .call()
            .await
            .map_err(|e| LedgerError::Contract(format!("getUnlockTime failed: {}", e)))?;

        let unlock_at = i64::try_from(u256_to_u64(unlock))
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or_else(|| LedgerError::Contract(format!("Invalid unlock time for {}", id)))?;

        Ok((can_access, unlock_at))
    }
}
