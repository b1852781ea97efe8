//! Token operation errors.
//!
//! Display strings are the user-facing messages and are kept stable.

use thiserror::Error;

use crate::abi::AbiError;
use crate::blockchain::BlockchainError;
use crate::fhe::{EncryptionError, SessionError};
use crate::token::amount::AmountError;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Recipient address and amount are required")]
    MissingInput,

    #[error("Invalid recipient address")]
    InvalidRecipient,

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("No wallet is available. Configure a signing wallet to use this feature.")]
    NoWallet,

    #[error("Please switch the wallet to chain {0} and try again.")]
    WrongNetwork(u64),

    #[error("Contract is not deployed on the connected network.")]
    NotDeployed,

    #[error("Encryption failed: missing handle")]
    MissingHandle,

    #[error("Encryption failed: missing inputProof")]
    MissingInputProof,

    #[error("Transfer simulation failed. Please check inputs and network.")]
    SimulationFailed,

    #[error("Transaction failed")]
    TransactionFailed,

    #[error("Transaction rejected by user")]
    TransactionRejected,

    #[error("Request rejected by user")]
    RequestRejected,

    #[error("Failed to decrypt balance")]
    DecryptionFailed,

    #[error("Contract interface has no usable `{0}` function")]
    MissingFunction(&'static str),

    #[error("Contract call encoding failed: {0}")]
    Codec(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error(transparent)]
    Chain(BlockchainError),
}

impl From<BlockchainError> for TokenError {
    fn from(err: BlockchainError) -> Self {
        match err {
            BlockchainError::UserRejected => Self::RequestRejected,
            other => Self::Chain(other),
        }
    }
}

impl TokenError {
    /// Message reported by the transfer flow, which words a wallet
    /// rejection as a declined transaction.
    pub fn transfer_message(&self) -> String {
        match self {
            Self::RequestRejected => Self::TransactionRejected.to_string(),
            other => other.to_string(),
        }
    }
}
