//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per token operation)
//!     → metrics.rs (outcome counters)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`, JSON output optional
//! - Every transfer/balance flow carries an operation ID
//! - Secrets (private keys, decryption key pairs) are never logged

pub mod logging;
pub mod metrics;
