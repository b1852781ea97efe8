//! Token interaction orchestrator.
//!
//! # Transfer
//! ```text
//! validate input → wallet → network (switch if needed) → session
//!     → encrypt amount → code check → calldata → simulate from caller
//!     → send with gas ceiling → receipt
//! ```
//!
//! # Balance
//! ```text
//! wallet → network → code check → requestBalanceAccess tx → balanceOf
//!     → session → key pair → EIP-712 authorization → signature → user decrypt
//! ```
//!
//! A failed encryption call resets the shared session.
//!
//! Transfers never return an error: every failure becomes a
//! [`TransferResult`] carrying a user-facing message. Balance queries return
//! [`TokenError`].

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

use crate::abi::{normalize, to_json_abi, InterfaceItem};
use crate::blockchain::{wait_for_receipt, ChainId, Ledger, TxReceipt, WalletProvider};
use crate::config::TokenConfig;
use crate::fhe::{
    DecryptionWindow, EncryptedInput, EncryptionError, HandleContractPair, SessionManager,
    UserDecryptRequest,
};
use crate::observability::metrics;
use crate::token::contract::encode_transfer;
use crate::token::error::TokenError;
use crate::token::types::{DecryptedBalance, TransferRequest, TransferResult};

fn lookup(abi: &JsonAbi, name: &'static str) -> Result<Function, TokenError> {
    abi.function(name)
        .and_then(|overloads| overloads.first())
        .cloned()
        .ok_or(TokenError::MissingFunction(name))
}

/// Client for one deployed confidential token.
pub struct TokenClient {
    config: Arc<TokenConfig>,
    wallet: Option<Arc<dyn WalletProvider>>,
    ledger: Arc<dyn Ledger>,
    sessions: SessionManager,
    balance_of: Function,
    request_balance_access: Function,
}

impl TokenClient {
    /// Build a client. `interface` is the contract interface as declared in
    /// source; encrypted parameter types are normalized here.
    pub fn new(
        config: Arc<TokenConfig>,
        wallet: Option<Arc<dyn WalletProvider>>,
        ledger: Arc<dyn Ledger>,
        sessions: SessionManager,
        interface: &[InterfaceItem],
    ) -> Result<Self, TokenError> {
        let abi = to_json_abi(&normalize(interface))?;
        let balance_of = lookup(&abi, "balanceOf")?;
        let request_balance_access = lookup(&abi, "requestBalanceAccess")?;

        Ok(Self {
            config,
            wallet,
            ledger,
            sessions,
            balance_of,
            request_balance_access,
        })
    }

    /// Send `amount` (decimal, 18 fractional digits) to `recipient`.
    pub async fn transfer(&self, recipient: &str, amount: &str) -> TransferResult {
        let operation_id = Uuid::new_v4();
        let span = tracing::info_span!("transfer", %operation_id, %recipient, %amount);

        async {
            let result = match self.try_transfer(recipient, amount).await {
                Ok(receipt) if receipt.success => {
                    tracing::info!(
                        tx_hash = %receipt.tx_hash,
                        block_number = ?receipt.block_number,
                        "Transfer confirmed"
                    );
                    TransferResult::succeeded(receipt.tx_hash)
                }
                Ok(receipt) => {
                    tracing::warn!(tx_hash = %receipt.tx_hash, "Transfer reverted");
                    TransferResult::failed(
                        TokenError::TransactionFailed.to_string(),
                        Some(receipt.tx_hash),
                    )
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Transfer failed");
                    TransferResult::failed(e.transfer_message(), None)
                }
            };
            metrics::record_transfer(result.success);
            result
        }
        .instrument(span)
        .await
    }

    async fn try_transfer(&self, recipient: &str, amount: &str) -> Result<TxReceipt, TokenError> {
        let request = TransferRequest::parse(recipient, amount)?;

        let wallet = self.wallet()?;
        self.ensure_network(wallet).await?;
        let user = wallet.address().await?;

        let session = self.sessions.acquire().await?;

        let payload = self.reset_on_failure(
            session
                .encrypt(EncryptedInput::new(self.config.contract_address, user).add_u64(request.amount))
                .await,
        )?;

        self.ensure_deployed().await?;

        let handle = payload.handles.first().copied().ok_or(TokenError::MissingHandle)?;
        if payload.input_proof.is_empty() {
            return Err(TokenError::MissingInputProof);
        }

        let data = encode_transfer(request.recipient, handle, payload.input_proof);
        tracing::debug!(
            selector = %Bytes::copy_from_slice(&data[..4]),
            calldata_len = data.len(),
            "Transfer calldata encoded"
        );

        // The contract verifies the input proof against msg.sender, so the
        // simulation must run from the caller's address.
        let simulation = TransactionRequest::default()
            .with_from(user)
            .with_to(self.config.contract_address)
            .with_input(data.clone());
        if let Err(e) = self.ledger.call(simulation).await {
            tracing::warn!(error = %e, "Transfer simulation failed");
            return Err(TokenError::SimulationFailed);
        }

        let tx_hash = self.send(wallet, user, data).await?;
        self.confirm(tx_hash).await
    }

    /// Decrypt the caller's balance.
    pub async fn get_balance(&self) -> Result<DecryptedBalance, TokenError> {
        let operation_id = Uuid::new_v4();
        let span = tracing::info_span!("get_balance", %operation_id);

        async {
            let result = self.try_get_balance().await;
            match &result {
                Ok(balance) => tracing::info!(handle = %balance.handle, "Balance decrypted"),
                Err(e) => tracing::warn!(error = %e, "Balance query failed"),
            }
            metrics::record_balance_query(result.is_ok());
            result
        }
        .instrument(span)
        .await
    }

    async fn try_get_balance(&self) -> Result<DecryptedBalance, TokenError> {
        let contract = self.config.contract_address;

        let wallet = self.wallet()?;
        self.ensure_network(wallet).await?;
        let user = wallet.address().await?;

        self.ensure_deployed().await?;

        let access = self.encode(&self.request_balance_access, &[])?;
        let tx_hash = self.send(wallet, user, access).await?;
        if !self.confirm(tx_hash).await?.success {
            return Err(TokenError::TransactionFailed);
        }
        tracing::debug!(tx_hash = %tx_hash, "Balance access granted");

        let handle = self.balance_handle(user).await?;
        tracing::debug!(handle = %handle, "Encrypted balance handle read");

        let session = self.sessions.acquire().await?;
        let keypair = self.reset_on_failure(session.generate_keypair().await)?;
        let window = DecryptionWindow::starting_now(
            self.config.decryption.clock_skew_secs,
            self.config.decryption.duration_days,
        );

        let authorization = self.reset_on_failure(
            session
                .create_eip712(&keypair.public_key, &[contract], window)
                .await,
        )?;
        let signature = wallet.sign_typed_data(&authorization).await?;

        let results = self.reset_on_failure(
            session
                .user_decrypt(UserDecryptRequest {
                    handles: vec![HandleContractPair {
                        handle,
                        contract_address: contract,
                    }],
                    keypair,
                    signature,
                    contract_addresses: vec![contract],
                    user_address: user,
                    window,
                })
                .await,
        )?;

        let raw = results.get(&handle).cloned().ok_or(TokenError::DecryptionFailed)?;
        Ok(DecryptedBalance { handle, raw })
    }

    /// Drop the cached session when it fails so the next operation builds
    /// a fresh one.
    fn reset_on_failure<T>(&self, result: Result<T, EncryptionError>) -> Result<T, TokenError> {
        result.map_err(|e| {
            tracing::warn!(error = %e, "Encryption session failed, resetting");
            self.sessions.reset();
            e.into()
        })
    }

    fn wallet(&self) -> Result<&dyn WalletProvider, TokenError> {
        self.wallet.as_deref().ok_or(TokenError::NoWallet)
    }

    /// Make sure the wallet is on the configured chain, asking it to switch
    /// if it is not.
    async fn ensure_network(&self, wallet: &dyn WalletProvider) -> Result<(), TokenError> {
        let expected = self.config.chain_id;
        let current = wallet.chain_id().await?;
        if current == expected {
            return Ok(());
        }

        let target = ChainId(expected);
        tracing::info!(current, expected, chain = %target.to_hex(), "Requesting network switch");
        if let Err(e) = wallet.switch_chain(target).await {
            tracing::warn!(error = %e, "Network switch refused");
            return Err(TokenError::WrongNetwork(expected));
        }

        let switched = wallet.chain_id().await?;
        if switched != expected {
            tracing::warn!(current = switched, expected, "Wallet still on the wrong network");
            return Err(TokenError::WrongNetwork(expected));
        }
        Ok(())
    }

    async fn ensure_deployed(&self) -> Result<(), TokenError> {
        let code = self.ledger.get_code(self.config.contract_address).await?;
        if code.is_empty() {
            return Err(TokenError::NotDeployed);
        }
        Ok(())
    }

    fn encode(&self, function: &Function, args: &[DynSolValue]) -> Result<Bytes, TokenError> {
        function
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| TokenError::Codec(e.to_string()))
    }

    async fn balance_handle(&self, user: Address) -> Result<B256, TokenError> {
        let data = self.encode(&self.balance_of, &[DynSolValue::Address(user)])?;
        let call = TransactionRequest::default()
            .with_from(user)
            .with_to(self.config.contract_address)
            .with_input(data);
        let output = self.ledger.call(call).await?;

        let decoded = self
            .balance_of
            .abi_decode_output(&output)
            .map_err(|e| TokenError::Codec(e.to_string()))?;
        match decoded.first() {
            Some(DynSolValue::FixedBytes(word, 32)) => Ok(*word),
            other => Err(TokenError::Codec(format!(
                "balanceOf returned {:?}, expected bytes32",
                other
            ))),
        }
    }

    async fn send(
        &self,
        wallet: &dyn WalletProvider,
        from: Address,
        data: Bytes,
    ) -> Result<TxHash, TokenError> {
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(self.config.contract_address)
            .with_input(data)
            .with_gas_limit(self.config.transfer.gas_limit)
            .with_value(U256::ZERO);
        let tx_hash = wallet.send_transaction(tx).await?;
        tracing::info!(tx_hash = %tx_hash, "Transaction submitted");
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> Result<TxReceipt, TokenError> {
        let transfer = &self.config.transfer;
        Ok(wait_for_receipt(
            self.ledger.as_ref(),
            tx_hash,
            Duration::from_millis(transfer.receipt_poll_interval_ms),
            Duration::from_secs(transfer.confirmation_timeout_secs),
        )
        .await?)
    }
}

impl std::fmt::Debug for TokenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenClient")
            .field("contract_address", &self.config.contract_address)
            .field("chain_id", &self.config.chain_id)
            .field("wallet", &self.wallet.is_some())
            .field("sessions", &self.sessions)
            .finish()
    }
}
