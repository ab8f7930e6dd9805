//! Schedulix client core - session and notification coordination.
//!
//! This crate owns the three stateful pieces of the Schedulix client:
//!
//! - [`auth::SessionManager`]: credential storage, decode/expiry checks, and
//!   the generation-guarded resolution pipeline that derives the
//!   authenticated-user view
//! - [`notifications::NotificationPoller`]: the 30-second background feed
//!   with optimistic mark-as-read
//! - [`recovery::RecoveryFlow`]: the three-step forgot-password protocol
//!
//! Everything visual - pages, forms, routing - lives outside and merely
//! reads the watch channels this core exposes or invokes its operations.
//! [`Core`] wires the pieces together for a process.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notifications;
pub mod recovery;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;

use api::{ApiClient, Transport};
use auth::{CredentialStore, SessionManager};
use config::Config;
use notifications::{NotificationPoller, DEFAULT_POLL_INTERVAL};
use recovery::RecoveryFlow;

/// Process-wide coordination handle.
///
/// Owns the session manager and the notification poller, and keeps the
/// supervisor task that starts/stops polling as the session phase changes.
/// Construct once per process, inside a tokio runtime.
pub struct Core {
    pub session: Arc<SessionManager>,
    pub notifications: Arc<NotificationPoller>,
    transport: Arc<dyn Transport>,
    store: Arc<CredentialStore>,
    supervisor: JoinHandle<()>,
}

impl Core {
    /// Build the production wiring: file-backed credential store and the
    /// reqwest transport pointed at the configured backend.
    pub fn new(config: &Config) -> Result<Self> {
        let store = Arc::new(CredentialStore::new(config.data_dir()?)?);
        let client = ApiClient::new(config.api_base_url.clone(), Arc::clone(&store))
            .map_err(|e| anyhow::anyhow!("failed to build API client: {e}"))?;
        let transport: Arc<dyn Transport> = Arc::new(client);
        Ok(Self::with_transport(transport, store, DEFAULT_POLL_INTERVAL))
    }

    /// Wire the core around an arbitrary transport. Tests and embedders use
    /// this to substitute fakes and shorten the poll interval.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        store: Arc<CredentialStore>,
        poll_interval: Duration,
    ) -> Self {
        let session = SessionManager::new(Arc::clone(&transport), Arc::clone(&store));
        let notifications =
            NotificationPoller::new(Arc::clone(&transport), Arc::clone(&session), poll_interval);
        let supervisor = Arc::clone(&notifications).spawn_supervisor(session.subscribe());

        Self {
            session,
            notifications,
            transport,
            store,
            supervisor,
        }
    }

    /// Resolve any persisted credential from a previous run.
    pub async fn bootstrap(&self) {
        self.session.bootstrap().await;
    }

    /// Open a fresh password-recovery flow. Independent of the session; at
    /// most one should be live at a time.
    pub fn recovery(&self) -> RecoveryFlow {
        RecoveryFlow::new(Arc::clone(&self.transport))
    }

    pub fn credential_store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Stop the supervisor and the poller. In-flight requests finish but
    /// their results are discarded.
    pub fn shutdown(&self) {
        self.supervisor.abort();
        self.notifications.stop();
    }
}
