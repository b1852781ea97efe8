//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! TOML file (optional) + environment variables
//!     → loader.rs (read & layer, env wins)
//!     → validation.rs (address, placeholder, chain id, RPC URL checks)
//!     → TokenConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never changes afterwards
//! - Everything except the contract address has a default
//! - Validation returns warnings separately from fatal errors

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve, ConfigError, LoadedConfig};
pub use schema::{
    BuildMode, DecryptionConfig, FileConfig, SessionConfig, TokenConfig, TransferConfig,
    SEPOLIA_CHAIN_ID,
};
pub use validation::ConfigWarning;
