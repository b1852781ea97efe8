//! Client library for an FHE-encrypted ERC-style token.

pub mod abi;
pub mod blockchain;
pub mod config;
pub mod fhe;
pub mod observability;
pub mod token;

pub use config::schema::TokenConfig;
pub use token::{DecryptedBalance, TokenClient, TokenError, TransferResult};
