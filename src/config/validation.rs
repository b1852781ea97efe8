//! Configuration validation.
//!
//! # Responsibilities
//! - Check the contract address format and placeholder usage
//! - Check the RPC URL scheme
//! - Flag an unexpected chain id
//! - Reject zero polling intervals
//!
//! Validation is a pure function over the raw values: it returns either the
//! warnings to emit or the first fatal error. Logging happens in the loader.

use std::fmt;

use crate::config::loader::ConfigError;
use crate::config::schema::{
    BuildMode, SessionConfig, TransferConfig, PLACEHOLDER_ADDRESS, SEPOLIA_CHAIN_ID,
};

/// Raw values as read from the environment, before typing.
#[derive(Debug, Clone, Copy)]
pub struct RawSettings<'a> {
    pub contract_address: &'a str,
    pub chain_id: u64,
    pub rpc_url: &'a str,
    pub build_mode: BuildMode,
}

/// Non-fatal configuration findings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Placeholder contract address in a development build.
    PlaceholderAddress,
    /// Chain id differs from the Sepolia test network.
    UnexpectedChainId(u64),
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::PlaceholderAddress => write!(
                f,
                "Development mode: using placeholder contract address. To use real contract \
                 features, deploy the token contract to Sepolia, set \
                 PRIVATE_TOKEN_CONTRACT_ADDRESS and restart"
            ),
            ConfigWarning::UnexpectedChainId(id) => write!(
                f,
                "PRIVATE_TOKEN_CHAIN_ID is {}, expected {} for the Sepolia testnet",
                id, SEPOLIA_CHAIN_ID
            ),
        }
    }
}

/// Returns true for `0x` followed by exactly 40 hex digits.
pub fn is_valid_address_format(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// Validate raw settings.
pub fn validate(raw: &RawSettings<'_>) -> Result<Vec<ConfigWarning>, ConfigError> {
    let mut warnings = Vec::new();

    if !is_valid_address_format(raw.contract_address) {
        return Err(ConfigError::InvalidContractAddress(
            raw.contract_address.to_string(),
        ));
    }

    let is_placeholder = raw
        .contract_address
        .parse()
        .map(|addr: alloy::primitives::Address| addr == PLACEHOLDER_ADDRESS)
        .unwrap_or(false);

    if is_placeholder {
        match raw.build_mode {
            BuildMode::Production => return Err(ConfigError::PlaceholderInProduction),
            BuildMode::Development => warnings.push(ConfigWarning::PlaceholderAddress),
        }
    }

    if raw.chain_id != SEPOLIA_CHAIN_ID {
        warnings.push(ConfigWarning::UnexpectedChainId(raw.chain_id));
    }

    if !raw.rpc_url.starts_with("http") {
        return Err(ConfigError::InvalidRpcUrl(raw.rpc_url.to_string()));
    }

    Ok(warnings)
}

/// Reject polling intervals of zero; a ticker needs a non-zero period.
pub fn validate_timing(
    session: &SessionConfig,
    transfer: &TransferConfig,
) -> Result<(), ConfigError> {
    if session.poll_interval_ms == 0 {
        return Err(ConfigError::ZeroInterval("session.poll_interval_ms"));
    }
    if transfer.receipt_poll_interval_ms == 0 {
        return Err(ConfigError::ZeroInterval("transfer.receipt_poll_interval_ms"));
    }
    Ok(())
}
