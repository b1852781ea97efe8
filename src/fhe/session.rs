//! Lazily initialized, process-wide encryption session.
//!
//! # Invariants
//! - At most one live session per manager
//! - Concurrent first calls await the same in-flight initialization
//! - A failed initialization leaves no state behind, so the next call retries
//! - `reset` drops both the cached session and any in-flight initialization;
//!   an initialization that completes after a reset is not cached

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, timeout};

use crate::blockchain::MIN_POLL_INTERVAL;
use crate::config::SessionConfig;
use crate::fhe::runtime::{EncryptionRuntime, SharedSession};
use crate::fhe::types::NetworkProfile;
use crate::observability::metrics;

/// Session setup failures. Cloneable so every waiter gets a copy.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The runtime never reported itself available.
    #[error("Timeout waiting for the encryption runtime to load after {0:?}. Please retry.")]
    LoadTimeout(Duration),

    /// Bootstrap or instance construction failed.
    #[error(
        "FHE initialization failed: {0}\n\n\
         Possible solutions:\n\
         1. Make sure the encryption host is running and reachable\n\
         2. Make sure the wallet is connected to the Sepolia network\n\
         3. Check that your network connection is stable\n\
         4. Retry; a failed initialization is never cached"
    )]
    Init(String),
}

/// Timing knobs for the availability wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub poll_interval: Duration,
    pub load_timeout: Duration,
}

impl From<&SessionConfig> for SessionSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            load_timeout: config.load_timeout(),
        }
    }
}

type InitFuture = Shared<BoxFuture<'static, Result<SharedSession, SessionError>>>;

#[derive(Default)]
struct SessionState {
    session: Option<SharedSession>,
    in_flight: Option<InitFuture>,
}

/// Owner of the single encryption session.
#[derive(Clone)]
pub struct SessionManager {
    runtime: Arc<dyn EncryptionRuntime>,
    profile: NetworkProfile,
    settings: SessionSettings,
    state: Arc<Mutex<SessionState>>,
}

impl SessionManager {
    pub fn new(
        runtime: Arc<dyn EncryptionRuntime>,
        profile: NetworkProfile,
        settings: SessionSettings,
    ) -> Self {
        Self {
            runtime,
            profile,
            settings,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the session, initializing it on first use.
    pub async fn acquire(&self) -> Result<SharedSession, SessionError> {
        let init = {
            let mut state = self.lock();
            if let Some(session) = &state.session {
                return Ok(session.clone());
            }
            match &state.in_flight {
                Some(init) => init.clone(),
                None => {
                    let init = initialize(self.runtime.clone(), self.profile.clone(), self.settings)
                        .boxed()
                        .shared();
                    state.in_flight = Some(init.clone());
                    init
                }
            }
        };

        let result = init.clone().await;

        let mut state = self.lock();
        // Only the waiter that still finds its own future in the slot settles
        // it; otherwise a sibling already did, or a reset intervened.
        if state.in_flight.as_ref().is_some_and(|f| f.ptr_eq(&init)) {
            state.in_flight = None;
            if let Ok(session) = &result {
                state.session = Some(session.clone());
            }
        }
        result
    }

    /// Drop the cached session and any in-flight initialization.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.session = None;
        state.in_flight = None;
        tracing::info!("Encryption session reset");
    }

    /// Whether a session is cached.
    pub fn is_ready(&self) -> bool {
        self.lock().session.is_some()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("profile", &self.profile.name)
            .field("settings", &self.settings)
            .field("ready", &self.is_ready())
            .finish()
    }
}

async fn initialize(
    runtime: Arc<dyn EncryptionRuntime>,
    profile: NetworkProfile,
    settings: SessionSettings,
) -> Result<SharedSession, SessionError> {
    tracing::info!(network = %profile.name, "Initializing encryption session");

    let result = async {
        wait_for_runtime(runtime.as_ref(), settings).await?;
        tracing::debug!("Encryption runtime available");

        runtime
            .init_sdk()
            .await
            .map_err(|e| SessionError::Init(e.to_string()))?;
        tracing::debug!("Encryption runtime bootstrapped");

        runtime
            .create_instance(&profile)
            .await
            .map_err(|e| SessionError::Init(e.to_string()))
    }
    .await;

    match &result {
        Ok(_) => {
            metrics::record_session_init(true);
            tracing::info!("Encryption session created");
        }
        Err(e) => {
            metrics::record_session_init(false);
            tracing::error!(error = %e, "Failed to initialize encryption session");
        }
    }
    result
}

/// Poll until the runtime reports itself available, up to `load_timeout`.
pub async fn wait_for_runtime(
    runtime: &dyn EncryptionRuntime,
    settings: SessionSettings,
) -> Result<(), SessionError> {
    if runtime.is_available().await {
        return Ok(());
    }

    tracing::debug!(
        poll_interval = ?settings.poll_interval,
        load_timeout = ?settings.load_timeout,
        "Waiting for encryption runtime"
    );

    timeout(settings.load_timeout, async {
        let mut ticker = interval(settings.poll_interval.max(MIN_POLL_INTERVAL));
        loop {
            ticker.tick().await;
            if runtime.is_available().await {
                return;
            }
        }
    })
    .await
    .map_err(|_| SessionError::LoadTimeout(settings.load_timeout))
}
