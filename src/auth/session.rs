//! Session lifecycle management.
//!
//! `SessionManager` turns the raw stored credential into a typed,
//! always-current authenticated-user view. Every credential change runs the
//! same resolution pipeline: decode locally, check expiry, fetch the profile.
//! Any failure along the way fails closed - the credential is cleared and
//! the session lands in `Unauthenticated`, never a partial state.
//!
//! Resolution is asynchronous, so completions can arrive out of order. Each
//! run is tagged with a monotonically increasing generation; a run whose
//! generation is no longer current commits nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiError, RegisterRequest, Transport};
use crate::auth::credentials::CredentialStore;
use crate::auth::{policy, token};
use crate::models::UserProfile;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Api(ApiError),
}

/// Where the session currently stands. `Init` and `Authenticating` are
/// transient; consumers should treat both as "loading".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Init,
    Authenticating,
    Authenticated,
    Unauthenticated,
}

impl SessionPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionPhase::Init | SessionPhase::Authenticating)
    }
}

/// Immutable snapshot of the current session, published through a watch
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub credential: Option<String>,
    pub user: Option<UserProfile>,
    pub phase: SessionPhase,
}

impl SessionState {
    fn initial() -> Self {
        Self {
            credential: None,
            user: None,
            phase: SessionPhase::Init,
        }
    }

    fn unauthenticated() -> Self {
        Self {
            credential: None,
            user: None,
            phase: SessionPhase::Unauthenticated,
        }
    }
}

/// Process-lifetime owner of the session. One instance per process.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    store: Arc<CredentialStore>,
    state: watch::Sender<SessionState>,
    generation: AtomicU64,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<CredentialStore>) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::initial());
        Arc::new(Self {
            transport,
            store,
            state,
            generation: AtomicU64::new(0),
        })
    }

    /// Watch for session changes. The poller and the UI both hang off this.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Snapshot of the current session.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.borrow().phase
    }

    /// Process start: resolve the persisted credential, or settle
    /// unauthenticated if there is none.
    pub async fn bootstrap(&self) {
        if self.store.get().is_some() {
            self.resolve().await;
        } else {
            let generation = self.next_generation();
            self.commit(generation, SessionState::unauthenticated());
        }
    }

    /// Authenticate against the backend, store the returned credential, and
    /// run resolution. Returns the raw token on success.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let response = self
            .transport
            .login(username, password)
            .await
            .map_err(|e| match e {
                e if e.is_client_error() => AuthError::InvalidCredentials,
                ApiError::Network(msg) => AuthError::Network(msg),
                other => AuthError::Api(other),
            })?;

        self.store
            .set(&response.token)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.resolve().await;
        Ok(response.token)
    }

    /// Register a new account. Input policy is checked locally first so
    /// invalid values never reach the backend.
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, AuthError> {
        policy::validate_username(&request.username).map_err(AuthError::Validation)?;
        policy::validate_password(&request.password).map_err(AuthError::Validation)?;

        self.transport.register(request).await.map_err(|e| match e {
            ApiError::Network(msg) => AuthError::Network(msg),
            other => AuthError::Api(other),
        })
    }

    /// Clear the credential and reset the session. Bumping the generation
    /// discards any resolution still in flight.
    pub fn logout(&self) {
        info!("logging out");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored credential");
        }
        let generation = self.next_generation();
        self.commit(generation, SessionState::unauthenticated());
    }

    /// Forced logout after the backend rejected the credential on any
    /// authenticated call.
    pub fn invalidate(&self) {
        warn!("credential rejected by the backend; invalidating session");
        self.logout();
    }

    /// Store an externally issued credential and resolve it.
    pub async fn set_credential(&self, token: &str) -> Result<(), AuthError> {
        self.store
            .set(token)
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.resolve().await;
        Ok(())
    }

    /// Profile-update setter contract: replaces the cached user after an
    /// external profile edit. Only meaningful while authenticated.
    pub fn set_user(&self, user: UserProfile) {
        self.state.send_if_modified(|state| {
            if state.phase == SessionPhase::Authenticated {
                state.user = Some(user);
                true
            } else {
                false
            }
        });
    }

    /// Run the decode -> expiry check -> profile fetch pipeline for whatever
    /// credential is currently stored.
    pub async fn resolve(&self) {
        let generation = self.next_generation();

        let Some(credential) = self.store.get() else {
            self.commit(generation, SessionState::unauthenticated());
            return;
        };

        let claims = match token::decode_unverified(&credential) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "stored credential failed to decode");
                self.discard_credential(generation);
                return;
            }
        };

        if claims.is_expired() {
            debug!(sub = %claims.sub, "stored credential is expired");
            self.discard_credential(generation);
            return;
        }

        self.commit(
            generation,
            SessionState {
                credential: Some(credential.clone()),
                user: None,
                phase: SessionPhase::Authenticating,
            },
        );

        match self.transport.fetch_current_user().await {
            Ok(user) => {
                let committed = self.commit(
                    generation,
                    SessionState {
                        credential: Some(credential),
                        user: Some(user),
                        phase: SessionPhase::Authenticated,
                    },
                );
                if committed {
                    info!("session authenticated");
                } else {
                    debug!("discarding stale resolution result");
                }
            }
            Err(e) => {
                // A token that decodes but is rejected by the backend is
                // untrustworthy; treat it the same as a decode failure.
                warn!(error = %e, "profile fetch failed; clearing credential");
                self.discard_credential(generation);
            }
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply a new state only if `generation` is still the most recent.
    /// The watch sender's lock makes the check-and-swap atomic with respect
    /// to concurrent commits.
    fn commit(&self, generation: u64, new_state: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = new_state;
            true
        })
    }

    /// Fail closed: drop the stored credential (only if this resolution is
    /// still current) and settle unauthenticated.
    fn discard_credential(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) == generation {
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "failed to clear stored credential");
            }
        }
        self.commit(generation, SessionState::unauthenticated());
    }
}
