//! Confidential token operations.
//!
//! # Data Flow
//! ```text
//! user input
//!     → types.rs (validation, amount.rs fixed-point conversion)
//!     → client.rs (wallet, session, ledger orchestration)
//!     → contract.rs (transfer calldata) / normalized ABI (balance reads)
//! ```

pub mod amount;
pub mod client;
pub mod contract;
pub mod error;
pub mod types;

pub use amount::{parse_amount, AmountError, TOKEN_DECIMALS};
pub use client::TokenClient;
pub use error::TokenError;
pub use types::{DecryptedBalance, TransferRequest, TransferResult};
