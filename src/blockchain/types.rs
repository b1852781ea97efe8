//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use alloy::transports::{RpcError, TransportErrorKind};
use thiserror::Error;

/// EIP-1193 code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Hex form used by `wallet_switchEthereumChain`.
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// No receipt within the allowed time.
    #[error("Transaction {0} not confirmed within {1} seconds")]
    ConfirmationTimeout(TxHash, u64),

    /// The user declined the request in the wallet.
    #[error("Request rejected by user")]
    UserRejected,

    /// The sender cannot pay for the transaction.
    #[error("Insufficient funds for transaction")]
    InsufficientFunds,

    /// Execution reverted without revert data (typically during estimation).
    #[error("Execution reverted during gas estimation. Check network and inputs.")]
    MissingRevertData,

    /// Execution reverted with a reason.
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),
}

impl BlockchainError {
    /// Map an alloy transport error onto the error taxonomy.
    pub fn from_rpc(err: RpcError<TransportErrorKind>) -> Self {
        if let Some(payload) = err.as_error_resp() {
            let message = payload.message.to_string();
            let lower = message.to_lowercase();
            if payload.code == USER_REJECTED_CODE {
                return Self::UserRejected;
            }
            if lower.contains("insufficient funds") {
                return Self::InsufficientFunds;
            }
            if lower.contains("missing revert data") {
                return Self::MissingRevertData;
            }
            if lower.contains("revert") {
                return Self::Reverted(message);
            }
            return Self::Rpc(format!("{} (code {})", message, payload.code));
        }
        Self::Rpc(err.to_string())
    }
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Outcome of an included transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    /// False when the transaction reverted.
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;

    fn rpc_error(code: i64, message: &'static str) -> RpcError<TransportErrorKind> {
        RpcError::ErrorResp(ErrorPayload {
            code,
            message: message.into(),
            data: None,
        })
    }

    #[test]
    fn test_chain_id_hex() {
        assert_eq!(ChainId(11_155_111).to_hex(), "0xaa36a7");
        assert_eq!(ChainId(1).to_hex(), "0x1");
    }

    #[test]
    fn test_rpc_error_classification() {
        assert!(matches!(
            BlockchainError::from_rpc(rpc_error(4001, "User denied transaction signature")),
            BlockchainError::UserRejected
        ));
        assert!(matches!(
            BlockchainError::from_rpc(rpc_error(-32000, "insufficient funds for gas * price + value")),
            BlockchainError::InsufficientFunds
        ));
        assert!(matches!(
            BlockchainError::from_rpc(rpc_error(-32000, "missing revert data")),
            BlockchainError::MissingRevertData
        ));
        assert!(matches!(
            BlockchainError::from_rpc(rpc_error(3, "execution reverted: not allowed")),
            BlockchainError::Reverted(_)
        ));
        assert!(matches!(
            BlockchainError::from_rpc(rpc_error(-32601, "method not found")),
            BlockchainError::Rpc(_)
        ));
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ConfirmationTimeout(TxHash::ZERO, 300);
        assert!(err.to_string().contains("300 seconds"));
    }
}
