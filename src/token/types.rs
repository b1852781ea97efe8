//! Token request and result types.

use alloy::primitives::{Address, TxHash, B256, U256};
use serde::Serialize;

use crate::config::validation::is_valid_address_format;
use crate::token::amount::{format_amount, parse_amount, TOKEN_DECIMALS};
use crate::token::error::TokenError;

/// A validated transfer: recipient plus magnitude in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: Address,
    pub amount: u64,
}

impl TransferRequest {
    /// Validate raw user input. Checks run in order and stop at the first
    /// failure: presence, recipient, amount.
    pub fn parse(recipient: &str, amount: &str) -> Result<Self, TokenError> {
        let recipient = recipient.trim();
        let amount = amount.trim();
        if recipient.is_empty() || amount.is_empty() {
            return Err(TokenError::MissingInput);
        }

        let recipient = parse_recipient(recipient).ok_or(TokenError::InvalidRecipient)?;
        let amount = parse_amount(amount, TOKEN_DECIMALS)?;

        Ok(Self { recipient, amount })
    }
}

/// Accept all-lowercase or all-uppercase hex, or mixed case with a valid
/// EIP-55 checksum.
fn parse_recipient(raw: &str) -> Option<Address> {
    if !is_valid_address_format(raw) {
        return None;
    }
    let hex = &raw[2..];
    let mixed_case = hex.chars().any(|c| c.is_ascii_lowercase())
        && hex.chars().any(|c| c.is_ascii_uppercase());
    if mixed_case {
        Address::parse_checksummed(raw, None).ok()
    } else {
        raw.parse().ok()
    }
}

/// Outcome of a transfer. Failures carry a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
}

impl TransferResult {
    pub fn succeeded(tx_hash: TxHash) -> Self {
        Self {
            success: true,
            error: None,
            tx_hash: Some(tx_hash),
        }
    }

    pub fn failed(error: impl Into<String>, tx_hash: Option<TxHash>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            tx_hash,
        }
    }
}

/// A decrypted balance as reported by the encryption service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecryptedBalance {
    pub handle: B256,
    /// Base units, as a decimal string.
    pub raw: String,
}

impl DecryptedBalance {
    /// The balance in whole tokens, if `raw` is numeric.
    pub fn tokens(&self) -> Option<String> {
        self.raw
            .parse::<U256>()
            .ok()
            .map(|value| format_amount(value, TOKEN_DECIMALS))
    }
}
