//! Timer-driven notification fetching with optimistic mutations.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, watch};
use tokio::time;

use coursehub_api::NotificationApi;
use coursehub_core::config::NotificationConfig;
use coursehub_core::error::AppError;
use coursehub_core::poll::{self, PollState};
use coursehub_core::result::AppResult;
use coursehub_core::task::TaskHandle;
use coursehub_entity::notification::NotificationRecord;
use coursehub_session::SessionStore;

use crate::cache::NotificationCache;

/// Poller timing.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Period of the fetch timer.
    pub interval: Duration,
    /// Wait between a confirmed mutation and its reconciling fetch.
    pub reconcile_delay: Duration,
}

impl From<&NotificationConfig> for PollerConfig {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            reconcile_delay: config.reconcile_delay(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::from(&NotificationConfig::default())
    }
}

/// Keeps a local notification cache approximately in sync with the backend.
///
/// Fetches are neither queued nor deduplicated: when a timer fetch and a
/// reconciling fetch overlap, whichever resolves last wins. A response that
/// resolves after the session token changed is discarded and treated like
/// any other fetch failure.
#[derive(Debug, Clone)]
pub struct NotificationPoller {
    /// Backend notification endpoints.
    api: Arc<dyn NotificationApi>,
    /// Session the poller reads its token from.
    store: Arc<SessionStore>,
    /// The cached view.
    cache: Arc<RwLock<NotificationCache>>,
    /// Failure-streak bookkeeping.
    poll: Arc<Mutex<PollState>>,
    /// Raised when the polling loop exits; pending reconciles give up.
    stopped: Arc<watch::Sender<bool>>,
    /// Timing.
    config: PollerConfig,
}

impl NotificationPoller {
    /// Create a poller with an empty cache.
    pub fn new(
        api: Arc<dyn NotificationApi>,
        store: Arc<SessionStore>,
        config: PollerConfig,
    ) -> Self {
        Self {
            api,
            store,
            cache: Arc::new(RwLock::new(NotificationCache::new())),
            poll: Arc::new(Mutex::new(PollState::default())),
            stopped: Arc::new(watch::channel(false).0),
            config,
        }
    }

    /// Copy of the whole cache.
    pub async fn snapshot(&self) -> NotificationCache {
        self.cache.read().await.clone()
    }

    /// Records the panel shows: the unread ones.
    pub async fn unread(&self) -> Vec<NotificationRecord> {
        self.cache.read().await.unread()
    }

    /// Badge counter.
    pub async fn unread_count(&self) -> u64 {
        self.cache.read().await.unread_count()
    }

    /// Fetch the full list and replace the cache with it.
    ///
    /// On any failure the cache is emptied; stale data is never kept next
    /// to an error.
    pub async fn fetch(&self) -> AppResult<()> {
        let Some(token) = self.store.token() else {
            self.cache.write().await.clear();
            return Err(AppError::session("No session; notifications cleared"));
        };

        let result = self.api.list_notifications(&token).await.and_then(|snapshot| {
            if self.store.token().as_deref() == Some(token.as_str()) {
                Ok(snapshot)
            } else {
                Err(AppError::session(
                    "Session changed while notifications were loading",
                ))
            }
        });

        match result {
            Ok(snapshot) => {
                let count = {
                    let mut cache = self.cache.write().await;
                    cache.replace(snapshot);
                    cache.unread_count()
                };
                if self.poll.lock().await.recover() {
                    tracing::info!("Notification fetch recovered");
                }
                tracing::debug!(unread = count, "Notifications refreshed");
                Ok(())
            }
            Err(e) => {
                self.cache.write().await.clear();
                if self.poll.lock().await.suppress() {
                    tracing::warn!("Notification fetch failed, showing an empty list: {}", e);
                } else {
                    tracing::debug!("Notification fetch still failing: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Mark one notification read locally, then on the backend.
    ///
    /// The local change is not rolled back if the backend refuses it; the
    /// next fetch settles the state.
    pub async fn mark_read(&self, notification_id: &str) -> AppResult<()> {
        let token = self.require_token()?;
        self.cache.write().await.mark_read(notification_id);

        self.api
            .mark_read(&token, notification_id)
            .await
            .inspect_err(|e| {
                tracing::warn!(id = %notification_id, "Failed to mark notification read: {}", e)
            })?;

        self.schedule_reconcile();
        Ok(())
    }

    /// Mark everything read locally, then on the backend.
    pub async fn mark_all_read(&self) -> AppResult<()> {
        let token = self.require_token()?;
        self.cache.write().await.mark_all_read();

        self.api
            .mark_all_read(&token)
            .await
            .inspect_err(|e| tracing::warn!("Failed to mark all notifications read: {}", e))?;

        self.schedule_reconcile();
        Ok(())
    }

    /// Delete one notification on the backend. The cache only changes
    /// through the reconciling fetch.
    pub async fn delete(&self, notification_id: &str) -> AppResult<()> {
        let token = self.require_token()?;

        self.api
            .delete_notification(&token, notification_id)
            .await
            .inspect_err(|e| {
                tracing::warn!(id = %notification_id, "Failed to delete notification: {}", e)
            })?;

        self.schedule_reconcile();
        Ok(())
    }

    fn require_token(&self) -> AppResult<String> {
        self.store
            .token()
            .ok_or_else(|| AppError::session("Not logged in"))
    }

    fn schedule_reconcile(&self) {
        let poller = self.clone();
        let delay = self.config.reconcile_delay;
        let mut stopped = self.stopped.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(delay) => {}
                _ = stopped.wait_for(|s| *s) => return,
            }
            tokio::select! {
                // Failures are already logged and reflected in the cache.
                _ = poller.fetch() => {}
                _ = stopped.wait_for(|s| *s) => {
                    tracing::debug!("Poller stopped, reconciling fetch abandoned");
                }
            }
        });
    }

    /// Spawn the polling loop.
    pub fn start(&self) -> TaskHandle {
        let (tx, rx) = TaskHandle::channel();
        self.stopped.send_replace(false);
        let poller = self.clone();
        let task = tokio::spawn(async move {
            poller.run(rx).await;
        });
        TaskHandle::new("notification-poller", tx, task)
    }

    async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Notification poller started, interval={}s",
            self.config.interval.as_secs()
        );

        let mut sessions = self.store.subscribe();
        let mut ticker = poll::ticker(self.config.interval);
        let mut polling_for: Option<String> = None;

        loop {
            let current = self.store.token();
            if current != polling_for {
                match &current {
                    Some(_) => {
                        tracing::debug!("Session present, polling notifications");
                        ticker.reset_immediately();
                    }
                    None => {
                        tracing::debug!("Session ended, notification polling paused");
                        self.cache.write().await.clear();
                        self.poll.lock().await.reset();
                    }
                }
                polling_for = current;
            }

            if polling_for.is_none() {
                tokio::select! {
                    changed = sessions.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        sessions.borrow_and_update();
                    }
                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            break;
                        }
                    }
                }
                continue;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = self.fetch() => {}
                        changed = cancel.changed() => {
                            if changed.is_err() || *cancel.borrow() {
                                break;
                            }
                        }
                    }
                }
                changed = sessions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    sessions.borrow_and_update();
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
            }
        }

        self.stopped.send_replace(true);
        tracing::info!("Notification poller stopped");
    }
}
