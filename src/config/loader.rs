//! Configuration loading from the environment and an optional TOML file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::{
    BuildMode, FileConfig, TokenConfig, DEFAULT_RPC_URL, SEPOLIA_CHAIN_ID,
};
use crate::config::validation::{validate, validate_timing, ConfigWarning, RawSettings};

pub const CONTRACT_ADDRESS_VAR: &str = "PRIVATE_TOKEN_CONTRACT_ADDRESS";
pub const CHAIN_ID_VAR: &str = "PRIVATE_TOKEN_CHAIN_ID";
pub const RPC_URL_VAR: &str = "PRIVATE_TOKEN_RPC_URL";
pub const BUILD_MODE_VAR: &str = "PRIVATE_TOKEN_BUILD_MODE";
pub const FHE_HOST_URL_VAR: &str = "PRIVATE_TOKEN_FHE_HOST_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required environment variable: {0}. Set it in the environment or the config file.")]
    MissingVar(&'static str),

    #[error("PRIVATE_TOKEN_CONTRACT_ADDRESS '{0}' is invalid: expected 0x followed by 40 hexadecimal characters")]
    InvalidContractAddress(String),

    #[error("Cannot use the placeholder contract address in production. Deploy the contract and set PRIVATE_TOKEN_CONTRACT_ADDRESS.")]
    PlaceholderInProduction,

    #[error("PRIVATE_TOKEN_CHAIN_ID '{0}' is not a valid chain id")]
    InvalidChainId(String),

    #[error("PRIVATE_TOKEN_RPC_URL must be a valid HTTP(S) URL, got '{0}'")]
    InvalidRpcUrl(String),

    #[error("PRIVATE_TOKEN_BUILD_MODE '{0}' is not one of development, production")]
    InvalidBuildMode(String),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
}

/// A resolved configuration plus the warnings found while validating it.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TokenConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Parse a TOML config file.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load configuration from the process environment, layered over an optional
/// file. Warnings are logged; fatal problems are returned.
pub fn load_config(path: Option<&Path>) -> Result<TokenConfig, ConfigError> {
    let file = match path {
        Some(path) => load_file(path)?,
        None => FileConfig::default(),
    };
    let vars: HashMap<String, String> = std::env::vars().collect();

    let loaded = resolve(&vars, file)?;
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let config = loaded.config;
    if config.build_mode.is_development() {
        tracing::info!(
            contract_address = %config.contract_address,
            chain_id = config.chain_id,
            rpc_url = %config.rpc_url,
            mode = config.build_mode.as_str(),
            "Configuration loaded"
        );
    }

    Ok(config)
}

/// Resolve a configuration from a variable map and file values.
///
/// Non-empty variables win over file values; file values win over defaults.
pub fn resolve(
    vars: &HashMap<String, String>,
    file: FileConfig,
) -> Result<LoadedConfig, ConfigError> {
    let var = |key: &str| {
        vars.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let contract_address = var(CONTRACT_ADDRESS_VAR)
        .or(file.contract_address)
        .ok_or(ConfigError::MissingVar(CONTRACT_ADDRESS_VAR))?;

    let chain_id = match var(CHAIN_ID_VAR) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidChainId(raw))?,
        None => file.chain_id.unwrap_or(SEPOLIA_CHAIN_ID),
    };

    let rpc_url = var(RPC_URL_VAR)
        .or(file.rpc_url)
        .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

    let build_mode = match var(BUILD_MODE_VAR) {
        Some(raw) => raw.parse().map_err(ConfigError::InvalidBuildMode)?,
        None => file.build_mode.unwrap_or_else(BuildMode::from_build),
    };

    let warnings = validate(&RawSettings {
        contract_address: &contract_address,
        chain_id,
        rpc_url: &rpc_url,
        build_mode,
    })?;

    let contract_address: Address = contract_address
        .parse()
        .map_err(|_| ConfigError::InvalidContractAddress(contract_address.clone()))?;

    let mut session = file.session;
    if let Some(host_url) = var(FHE_HOST_URL_VAR) {
        session.host_url = host_url;
    }
    validate_timing(&session, &file.transfer)?;

    let config = TokenConfig {
        contract_address,
        chain_id,
        rpc_url,
        failover_rpc_urls: file.failover_rpc_urls,
        build_mode,
        rpc_timeout_secs: file.rpc_timeout_secs.unwrap_or(10),
        session,
        decryption: file.decryption,
        transfer: file.transfer,
    };

    Ok(LoadedConfig { config, warnings })
}
