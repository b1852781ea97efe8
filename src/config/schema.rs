//! Configuration schema definitions.
//!
//! `FileConfig` mirrors the optional TOML file; every field is optional so a
//! file may set only what it needs. `TokenConfig` is the resolved, validated
//! result shared by all subsystems.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chain id of the Sepolia test network.
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Public Sepolia endpoint used when no RPC URL is configured.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

/// Local encryption host used when none is configured.
pub const DEFAULT_FHE_HOST_URL: &str = "http://127.0.0.1:4100";

/// Conventional unset address.
pub const PLACEHOLDER_ADDRESS: Address = Address::ZERO;

/// Build mode, selecting warning or fatal severity for placeholder values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Mode implied by how the binary was compiled.
    pub fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::str::FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(other.to_string()),
        }
    }
}

/// Resolved runtime configuration. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct TokenConfig {
    /// Deployed token contract.
    pub contract_address: Address,

    /// Chain the wallet must be connected to.
    pub chain_id: u64,

    /// JSON-RPC endpoint for reads and receipts.
    pub rpc_url: String,

    /// Endpoints tried after `rpc_url` fails.
    pub failover_rpc_urls: Vec<String>,

    pub build_mode: BuildMode,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    pub session: SessionConfig,

    pub decryption: DecryptionConfig,

    pub transfer: TransferConfig,
}

/// Encryption session settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of the encryption host.
    pub host_url: String,

    /// Interval between runtime availability checks.
    pub poll_interval_ms: u64,

    /// Upper bound on the runtime availability wait.
    pub load_timeout_ms: u64,
}

impl SessionConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host_url: DEFAULT_FHE_HOST_URL.to_string(),
            poll_interval_ms: 100,
            load_timeout_ms: 10_000,
        }
    }
}

/// User-decryption authorization window.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DecryptionConfig {
    /// Seconds subtracted from "now" to tolerate clock drift.
    pub clock_skew_secs: u64,

    /// Validity of the signed authorization, in days.
    pub duration_days: u32,
}

impl Default for DecryptionConfig {
    fn default() -> Self {
        Self {
            clock_skew_secs: 60,
            duration_days: 1,
        }
    }
}

/// Transaction submission settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TransferConfig {
    /// Fixed gas ceiling for token transactions.
    pub gas_limit: u64,

    /// Maximum wait for a receipt.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval.
    pub receipt_poll_interval_ms: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            gas_limit: 1_200_000,
            confirmation_timeout_secs: 300,
            receipt_poll_interval_ms: 2_000,
        }
    }
}

/// Optional TOML file contents. Environment variables take precedence.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    pub contract_address: Option<String>,
    pub chain_id: Option<u64>,
    pub rpc_url: Option<String>,
    pub failover_rpc_urls: Vec<String>,
    pub build_mode: Option<BuildMode>,
    pub rpc_timeout_secs: Option<u64>,
    pub session: SessionConfig,
    pub decryption: DecryptionConfig,
    pub transfer: TransferConfig,
}
