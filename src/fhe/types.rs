//! Values exchanged with the encryption service.

use alloy::primitives::{Address, Bytes, Signature, B256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Network parameters the encryption instance is built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub name: String,
    pub chain_id: u64,
    pub relayer_url: String,
}

impl NetworkProfile {
    /// The Sepolia test network profile.
    pub fn sepolia() -> Self {
        Self {
            name: "sepolia".to_string(),
            chain_id: 11_155_111,
            relayer_url: "https://relayer.testnet.zama.cloud".to_string(),
        }
    }
}

/// Plaintext values to encrypt for a specific contract and submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedInput {
    pub contract_address: Address,
    pub user_address: Address,
    pub values: Vec<u64>,
}

impl EncryptedInput {
    pub fn new(contract_address: Address, user_address: Address) -> Self {
        Self {
            contract_address,
            user_address,
            values: Vec::new(),
        }
    }

    /// Append a 64-bit magnitude.
    pub fn add_u64(mut self, value: u64) -> Self {
        self.values.push(value);
        self
    }
}

/// Ciphertext handles plus the proof binding them to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub handles: Vec<B256>,
    pub input_proof: Bytes,
}

/// Single-use key pair for user decryption.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: String,
    pub private_key: String,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Validity window of a decryption authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptionWindow {
    /// Unix seconds.
    pub start_timestamp: u64,
    pub duration_days: u32,
}

impl DecryptionWindow {
    /// A window opening `clock_skew_secs` before now.
    pub fn starting_now(clock_skew_secs: u64, duration_days: u32) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            start_timestamp: now.saturating_sub(clock_skew_secs),
            duration_days,
        }
    }
}

/// A ciphertext handle and the contract it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleContractPair {
    pub handle: B256,
    pub contract_address: Address,
}

/// Everything the service needs to re-encrypt handles for the user.
#[derive(Debug, Clone)]
pub struct UserDecryptRequest {
    pub handles: Vec<HandleContractPair>,
    pub keypair: KeyPair,
    pub signature: Signature,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    pub window: DecryptionWindow,
}
