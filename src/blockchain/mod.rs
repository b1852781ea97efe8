//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key, RPC URL)
//!     → wallet.rs (key loading, typed-data signing, submission, chain switch)
//!     → client.rs (reads: code, eth_call, receipts; timeouts and failover)
//!     → transaction.rs (receipt polling)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{Ledger, LedgerClient};
pub use transaction::{wait_for_receipt, MIN_POLL_INTERVAL};
pub use types::{BlockchainError, BlockchainResult, ChainId, TxReceipt};
pub use wallet::{LocalWallet, WalletProvider};
