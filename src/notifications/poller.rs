//! Periodic notification poller.
//!
//! Fetches the unread-notification list on a fixed interval while the
//! session is authenticated. The server is the source of truth for "unread":
//! each successful fetch replaces the whole local mapping and the unread
//! count is the number of entries returned. A failed poll keeps the previous
//! feed and is retried on the next tick; it never disturbs the UI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{ApiError, Transport};
use crate::auth::session::{SessionManager, SessionPhase, SessionState};
use crate::models::NotificationItem;

/// Fixed polling interval used in production.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Current feed snapshot. Item order is arrival order (server sends newest
/// first); entries are keyed by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    pub items: Vec<NotificationItem>,
    pub unread_count: usize,
}

/// Cancellable recurring fetch task with optimistic mark-as-read.
pub struct NotificationPoller {
    transport: Arc<dyn Transport>,
    session: Arc<SessionManager>,
    interval: Duration,
    state: watch::Sender<NotificationState>,
    running: AtomicBool,
    in_flight: AtomicBool,
    /// Stop handle for the current polling run. Each run gets its own
    /// channel so a restart can never be confused with an old run's stop.
    stop_signal: Mutex<Option<watch::Sender<bool>>>,
}

impl NotificationPoller {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<SessionManager>,
        interval: Duration,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(NotificationState::default());
        Arc::new(Self {
            transport,
            session,
            interval,
            state,
            running: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
            stop_signal: Mutex::new(None),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> NotificationState {
        self.state.borrow().clone()
    }

    pub fn unread_count(&self) -> usize {
        self.state.borrow().unread_count
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Begin polling. The first fetch runs immediately, then every interval.
    /// No-op if already running.
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let (stop_tx, mut stop_rx) = watch::channel(false);
        *self.stop_signal.lock().unwrap() = Some(stop_tx);

        let poller = Arc::clone(&self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poller.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        poller.refresh().await;
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("notification polling task exited");
        });

        info!("notification polling started");
    }

    /// Cancel the timer. An in-flight fetch is allowed to finish but its
    /// result is discarded.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(stop) = self.stop_signal.lock().unwrap().take() {
            let _ = stop.send(true);
        }
        info!("notification polling stopped");
    }

    /// Wipe the local feed; used on logout and session invalidation.
    pub fn clear(&self) {
        self.state.send_if_modified(|state| {
            if state.items.is_empty() && state.unread_count == 0 {
                return false;
            }
            state.items.clear();
            state.unread_count = 0;
            true
        });
    }

    /// Fetch the feed once. Skipped if another fetch is already in flight;
    /// the timer schedule is unaffected either way.
    pub async fn refresh(&self) {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("refresh already in flight; skipping tick");
            return;
        }
        let result = self.transport.fetch_notifications().await;
        self.in_flight.store(false, Ordering::SeqCst);

        if !self.running.load(Ordering::SeqCst) {
            debug!("poller stopped; discarding fetch result");
            return;
        }

        match result {
            Ok(items) => {
                let unread_count = items.len();
                self.state.send_replace(NotificationState {
                    items,
                    unread_count,
                });
            }
            Err(ApiError::Unauthorized) => {
                warn!("notification fetch rejected with 401");
                self.session.invalidate();
            }
            Err(e) => {
                // Transient poll failure; keep the previous feed and let the
                // next tick retry.
                warn!(error = %e, "notification fetch failed; keeping previous feed");
            }
        }
    }

    /// Optimistically remove a notification and tell the backend. If the
    /// backend call fails with an uncertain outcome, refetch the
    /// authoritative feed instead of guessing the pre-failure state.
    pub async fn mark_as_read(&self, id: i64) {
        let removed = self.state.send_if_modified(|state| {
            let Some(pos) = state.items.iter().position(|item| item.id == id) else {
                return false;
            };
            state.items.remove(pos);
            state.unread_count = state.unread_count.saturating_sub(1);
            true
        });

        if !removed {
            debug!(id, "notification not present locally; nothing to do");
            return;
        }

        match self.transport.mark_notification_read(id).await {
            Ok(()) => {}
            Err(ApiError::Unauthorized) => {
                warn!(id, "mark-as-read rejected with 401");
                self.session.invalidate();
            }
            Err(e) => {
                warn!(error = %e, id, "mark-as-read failed; refetching feed");
                self.refresh().await;
            }
        }
    }

    /// Tie the poller's lifetime to the session: polling runs exactly while
    /// the session is authenticated, and the feed is cleared whenever it is
    /// not.
    pub fn spawn_supervisor(
        self: Arc<Self>,
        mut session_rx: watch::Receiver<SessionState>,
    ) -> JoinHandle<()> {
        let poller = self;
        tokio::spawn(async move {
            loop {
                let phase = session_rx.borrow_and_update().phase;
                if phase == SessionPhase::Authenticated {
                    Arc::clone(&poller).start();
                } else {
                    poller.stop();
                    poller.clear();
                }
                if session_rx.changed().await.is_err() {
                    break;
                }
            }
            poller.stop();
        })
    }
}
