//! Encryption service integration.
//!
//! # Data Flow
//! ```text
//! SessionManager::acquire()
//!     → session.rs (cache / shared in-flight init / availability wait)
//!     → runtime.rs traits (init_sdk → create_instance)
//!     → host.rs (HTTP encryption host) or any other EncryptionRuntime
//! ```

pub mod host;
pub mod runtime;
pub mod session;
pub mod types;

pub use host::HttpEncryptionRuntime;
pub use runtime::{EncryptionError, EncryptionRuntime, EncryptionSession, SharedSession};
pub use session::{wait_for_runtime, SessionError, SessionManager, SessionSettings};
pub use types::{
    DecryptionWindow, EncryptedInput, EncryptedPayload, HandleContractPair, KeyPair,
    NetworkProfile, UserDecryptRequest,
};
