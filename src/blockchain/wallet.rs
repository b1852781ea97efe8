//! Wallet abstraction and a local-key implementation.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::dyn_abi::TypedData;
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Signature, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "PRIVATE_TOKEN_PRIVATE_KEY";

/// A signer able to authorize requests and submit transactions.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Chain the wallet is currently connected to.
    async fn chain_id(&self) -> BlockchainResult<u64>;

    /// Ask the wallet to switch to `chain_id` (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: ChainId) -> BlockchainResult<()>;

    /// Address of the active account.
    async fn address(&self) -> BlockchainResult<Address>;

    /// Produce an EIP-712 signature over `payload`.
    async fn sign_typed_data(&self, payload: &TypedData) -> BlockchainResult<Signature>;

    /// Sign and broadcast a transaction, returning its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> BlockchainResult<TxHash>;
}

/// Wallet backed by a local private key and an RPC endpoint.
#[derive(Clone)]
pub struct LocalWallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Provider that fills nonce, gas and chain id and signs with `signer`.
    provider: Arc<dyn Provider + Send + Sync>,
}

impl LocalWallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `rpc_url` - Endpoint used to submit transactions
    pub fn from_private_key(private_key_hex: &str, rpc_url: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer.clone()))
            .connect_http(url);

        tracing::info!(address = %signer.address(), "Wallet initialized");

        Ok(Self {
            signer,
            provider: Arc::new(provider),
        })
    }

    /// Load wallet from environment variable.
    ///
    /// Returns `Ok(None)` when `PRIVATE_TOKEN_PRIVATE_KEY` is unset, so callers
    /// can report a missing wallet at the point of use.
    pub fn from_env(rpc_url: &str) -> BlockchainResult<Option<Self>> {
        match std::env::var(PRIVATE_KEY_ENV_VAR) {
            Ok(key) if !key.trim().is_empty() => Self::from_private_key(key.trim(), rpc_url).map(Some),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn chain_id(&self) -> BlockchainResult<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(BlockchainError::from_rpc)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> BlockchainResult<()> {
        let params = serde_json::value::to_raw_value(&[serde_json::json!({
            "chainId": chain_id.to_hex()
        })])
        .map_err(|e| BlockchainError::Wallet(format!("Invalid switch request: {}", e)))?;
        self.provider
            .raw_request_dyn("wallet_switchEthereumChain".into(), &params)
            .await
            .map(|_| ())
            .map_err(BlockchainError::from_rpc)
    }

    async fn address(&self) -> BlockchainResult<Address> {
        Ok(self.signer.address())
    }

    async fn sign_typed_data(&self, payload: &TypedData) -> BlockchainResult<Signature> {
        self.signer
            .sign_dynamic_typed_data(payload)
            .await
            .map_err(|e| BlockchainError::Wallet(format!("Typed data signing failed: {}", e)))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> BlockchainResult<TxHash> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(BlockchainError::from_rpc)?;
        Ok(*pending.tx_hash())
    }
}

impl std::fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}
