//! Encryption service seams.
//!
//! An [`EncryptionRuntime`] is the loader: it reports availability, boots the
//! SDK and builds instances. An [`EncryptionSession`] is a built instance.

use alloy::dyn_abi::TypedData;
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::fhe::types::{
    DecryptionWindow, EncryptedInput, EncryptedPayload, KeyPair, NetworkProfile,
    UserDecryptRequest,
};

/// Errors reported by the encryption service.
#[derive(Debug, Clone, Error)]
pub enum EncryptionError {
    /// The service could not be reached or answered with a failure.
    #[error("Encryption service error: {0}")]
    Service(String),

    /// The service answered with something unusable.
    #[error("Unexpected encryption service response: {0}")]
    Protocol(String),
}

/// Shared handle to an initialized session.
pub type SharedSession = Arc<dyn EncryptionSession>;

/// Loader side of the encryption service.
#[async_trait]
pub trait EncryptionRuntime: Send + Sync {
    /// Whether the runtime is loaded and ready to be initialized.
    async fn is_available(&self) -> bool;

    /// One-time runtime bootstrap.
    async fn init_sdk(&self) -> Result<(), EncryptionError>;

    /// Build an instance for `profile`.
    async fn create_instance(
        &self,
        profile: &NetworkProfile,
    ) -> Result<SharedSession, EncryptionError>;
}

/// Operations of an initialized encryption instance.
#[async_trait]
pub trait EncryptionSession: Send + Sync {
    /// Encrypt the input's values, returning one handle per value plus a proof.
    async fn encrypt(&self, input: EncryptedInput) -> Result<EncryptedPayload, EncryptionError>;

    /// Fresh key pair for a single user decryption.
    async fn generate_keypair(&self) -> Result<KeyPair, EncryptionError>;

    /// EIP-712 payload authorizing decryption for `contracts` within `window`.
    async fn create_eip712(
        &self,
        public_key: &str,
        contracts: &[Address],
        window: DecryptionWindow,
    ) -> Result<TypedData, EncryptionError>;

    /// Decrypt the requested handles, keyed by handle.
    async fn user_decrypt(
        &self,
        request: UserDecryptRequest,
    ) -> Result<HashMap<B256, String>, EncryptionError>;
}
