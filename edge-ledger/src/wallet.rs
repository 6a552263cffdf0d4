//! Agent signing wallet

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;
use tracing::info;

use crate::types::{LedgerError, Result};

/// The key the agent publishes strategies with
#[derive(Clone)]
pub struct LedgerWallet {
    signer: PrivateKeySigner,
    address: Address,
}

impl LedgerWallet {
    /// Create a wallet from a private key hex string, with or without `0x`
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let key = private_key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);

        let key_bytes = B256::from_str(key)
            .map_err(|e| LedgerError::Wallet(format!("Invalid private key format: {}", e)))?;

        let signer = PrivateKeySigner::from_bytes(&key_bytes)
            .map_err(|e| LedgerError::Wallet(format!("Failed to create signer: {}", e)))?;

        let address = signer.address();
        info!("Loaded agent wallet: {}", address);

        Ok(Self { signer, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Checksummed address
    pub fn address_string(&self) -> String {
        self.address.to_checksum(None)
    }

    /// Wallet for the provider's signing filler
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl std::fmt::Debug for LedgerWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerWallet")
            .field("address", &self.address)
            .finish()
    }
}
