//! Periodic token liveness monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::{self, Instant};

use coursehub_core::config::SessionConfig;
use coursehub_core::poll::{self, PollState};
use coursehub_core::task::TaskHandle;
use coursehub_core::traits::Clock;
use coursehub_entity::session::token_fingerprint;

use super::handler::{ForcedLogout, ForcedLogoutHandler};
use super::state::{CheckOutcome, LivenessState};
use crate::store::SessionStore;
use crate::token::{TokenRejection, inspect_token};

/// Timing and messaging for the monitor.
#[derive(Debug, Clone)]
pub struct LivenessConfig {
    /// Timer period and minimum spacing between two checks.
    pub interval: Duration,
    /// Grace period after a new token appears.
    pub startup_delay: Duration,
    /// Route handed to the forced-logout handler.
    pub login_route: String,
    /// Message handed to the forced-logout handler.
    pub expired_message: String,
}

impl From<&SessionConfig> for LivenessConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            interval: config.liveness_interval(),
            startup_delay: config.startup_delay(),
            login_route: config.login_route.clone(),
            expired_message: config.expired_message.clone(),
        }
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

/// Mutable monitor state, guarded as a unit.
#[derive(Debug)]
struct MonitorState {
    /// Current machine state.
    state: LivenessState,
    /// Token the state refers to.
    token: Option<String>,
    /// When `token` was first seen.
    armed_at: Option<Instant>,
    /// Check spacing and the "already notified" flag.
    poll: PollState,
    /// Last token the side effect fired for.
    invalidated: Option<String>,
}

impl MonitorState {
    fn new() -> Self {
        Self {
            state: LivenessState::Idle,
            token: None,
            armed_at: None,
            poll: PollState::default(),
            invalidated: None,
        }
    }

    /// Align with the token currently in the store. Returns `true` when a
    /// new token was armed.
    fn sync(&mut self, current: Option<&str>, now: Instant) -> bool {
        match current {
            None => {
                if self.token.is_some() {
                    tracing::debug!(from = %self.state, "Session gone, liveness monitor idle");
                }
                self.state = LivenessState::Idle;
                self.token = None;
                self.armed_at = None;
                false
            }
            Some(token) if self.token.as_deref() == Some(token) => false,
            Some(token) => {
                self.token = Some(token.to_string());
                if self.invalidated.as_deref() == Some(token) {
                    // Same rejected value put back; stays terminal.
                    self.state = LivenessState::Invalid;
                    return false;
                }
                self.state = LivenessState::Armed;
                self.armed_at = Some(now);
                self.poll.reset();
                tracing::debug!(token = %token_fingerprint(token), "Liveness monitor armed");
                true
            }
        }
    }
}

/// Watches the session token and force-ends the session the first time it
/// is found malformed or expired.
///
/// The check itself never touches the network. It runs on a timer, after a
/// short grace period whenever a new token appears, and on demand through
/// [`check`](Self::check); calls closer together than the configured
/// interval are skipped.
#[derive(Debug)]
pub struct SessionLivenessMonitor {
    /// Session the monitor guards.
    store: Arc<SessionStore>,
    /// Wall clock used for expiry comparisons.
    clock: Arc<dyn Clock>,
    /// Receives the forced-logout notice.
    handler: Arc<dyn ForcedLogoutHandler>,
    /// Timing and messaging.
    config: LivenessConfig,
    /// Machine state.
    inner: Mutex<MonitorState>,
}

impl SessionLivenessMonitor {
    /// Create a monitor. Nothing runs until [`start`](Self::start) or
    /// [`check`](Self::check) is called.
    pub fn new(
        store: Arc<SessionStore>,
        clock: Arc<dyn Clock>,
        handler: Arc<dyn ForcedLogoutHandler>,
        config: LivenessConfig,
    ) -> Self {
        Self {
            store,
            clock,
            handler,
            config,
            inner: Mutex::new(MonitorState::new()),
        }
    }

    /// Current machine state.
    pub async fn state(&self) -> LivenessState {
        self.inner.lock().await.state
    }

    /// Pick up a token change without checking it. Returns `true` when a
    /// new token was armed.
    pub async fn observe(&self) -> bool {
        let token = self.store.token();
        self.inner.lock().await.sync(token.as_deref(), Instant::now())
    }

    /// Run one on-demand liveness check, subject to the grace period and the
    /// minimum interval.
    pub async fn check(&self) -> CheckOutcome {
        self.run_check(false).await
    }

    /// Check driven by the monitor's own timer. The minimum interval is not
    /// applied; the ticker spaces these checks.
    async fn timer_check(&self) -> CheckOutcome {
        self.run_check(true).await
    }

    async fn run_check(&self, from_timer: bool) -> CheckOutcome {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        inner.sync(self.store.token().as_deref(), now);

        let Some(token) = inner.token.clone() else {
            return CheckOutcome::NoSession;
        };

        if inner.state == LivenessState::Invalid {
            return CheckOutcome::AlreadyInvalid;
        }

        if let Some(armed_at) = inner.armed_at {
            if now.saturating_duration_since(armed_at) < self.config.startup_delay {
                return CheckOutcome::Deferred;
            }
        }

        if !from_timer && !inner.poll.is_due(self.config.interval, now) {
            return CheckOutcome::Throttled;
        }
        inner.poll.mark_checked(now);

        match inspect_token(&token, self.clock.now()) {
            Ok(claims) => {
                inner.state = LivenessState::Valid;
                tracing::trace!(expires_at = %claims.expires_at, "Token still valid");
                CheckOutcome::Valid {
                    expires_at: claims.expires_at,
                }
            }
            Err(reason) => {
                inner.state = LivenessState::Invalid;
                if !inner.poll.suppress() {
                    return CheckOutcome::AlreadyInvalid;
                }
                inner.invalidated = Some(token.clone());
                self.force_logout(&token, reason.clone());
                CheckOutcome::Invalidated { reason }
            }
        }
    }

    fn force_logout(&self, token: &str, reason: TokenRejection) {
        tracing::info!(token = %token_fingerprint(token), %reason, "Forcing logout");

        if let Err(e) = self.store.clear_session() {
            tracing::error!("Failed to clear session during forced logout: {}", e);
        }

        let notice = ForcedLogout {
            reason,
            message: self.config.expired_message.clone(),
            redirect_to: self.config.login_route.clone(),
            token_fingerprint: token_fingerprint(token),
        };
        self.handler.on_forced_logout(&notice);
    }

    /// Spawn the periodic loop.
    pub fn start(self: &Arc<Self>) -> TaskHandle {
        let (tx, rx) = TaskHandle::channel();
        let monitor = Arc::clone(self);
        let task = tokio::spawn(async move {
            monitor.run(rx).await;
        });
        TaskHandle::new("session-liveness", tx, task)
    }

    async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Liveness monitor started, interval={}s",
            self.config.interval.as_secs()
        );

        let mut sessions = self.store.subscribe();
        let mut ticker = poll::ticker(self.config.interval);

        let startup = time::sleep(self.config.startup_delay);
        tokio::pin!(startup);
        let mut startup_pending = self.observe().await;

        loop {
            tokio::select! {
                _ = &mut startup, if startup_pending => {
                    startup_pending = false;
                    self.check_and_log().await;
                    ticker.reset();
                }
                _ = ticker.tick() => {
                    self.check_and_log().await;
                }
                changed = sessions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    sessions.borrow_and_update();
                    if self.observe().await {
                        startup
                            .as_mut()
                            .reset(Instant::now() + self.config.startup_delay);
                        startup_pending = true;
                    }
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Liveness monitor stopped");
    }

    async fn check_and_log(&self) {
        match self.timer_check().await {
            CheckOutcome::Invalidated { reason } => {
                tracing::debug!(%reason, "Liveness check invalidated the session");
            }
            outcome => tracing::trace!(?outcome, "Liveness check"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use coursehub_core::traits::ManualClock;
    use serde_json::json;

    use super::*;
    use crate::token::inspect::tests::token_with;

    /// Records every notice it receives.
    #[derive(Debug, Default)]
    struct RecordingHandler {
        notices: StdMutex<Vec<ForcedLogout>>,
    }

    impl RecordingHandler {
        fn count(&self) -> usize {
            self.notices.lock().unwrap().len()
        }

        fn last(&self) -> Option<ForcedLogout> {
            self.notices.lock().unwrap().last().cloned()
        }
    }

    impl ForcedLogoutHandler for RecordingHandler {
        fn on_forced_logout(&self, notice: &ForcedLogout) {
            self.notices.lock().unwrap().push(notice.clone());
        }
    }

    struct Fixture {
        store: Arc<SessionStore>,
        clock: Arc<ManualClock>,
        handler: Arc<RecordingHandler>,
        monitor: Arc<SessionLivenessMonitor>,
    }

    fn fixture(now_epoch: i64) -> Fixture {
        let store = Arc::new(SessionStore::in_memory());
        let clock = Arc::new(ManualClock::at_epoch_seconds(now_epoch));
        let handler = Arc::new(RecordingHandler::default());
        let monitor = Arc::new(SessionLivenessMonitor::new(
            Arc::clone(&store),
            clock.clone(),
            handler.clone(),
            LivenessConfig::default(),
        ));
        Fixture {
            store,
            clock,
            handler,
            monitor,
        }
    }

    async fn past_startup() {
        time::advance(Duration::from_secs(2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_token_is_idle() {
        let f = fixture(200);
        assert_eq!(f.monitor.check().await, CheckOutcome::NoSession);
        assert_eq!(f.monitor.state().await, LivenessState::Idle);
        assert_eq!(f.handler.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_token_is_deferred_then_valid() {
        let f = fixture(200);
        f.store
            .set_session(token_with(&json!({"exp": 1000})), None)
            .unwrap();

        assert_eq!(f.monitor.check().await, CheckOutcome::Deferred);
        assert_eq!(f.monitor.state().await, LivenessState::Armed);

        past_startup().await;
        let outcome = f.monitor.check().await;
        assert!(matches!(outcome, CheckOutcome::Valid { .. }));
        assert_eq!(f.monitor.state().await, LivenessState::Valid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_checks_inside_interval_are_throttled() {
        let f = fixture(200);
        f.store
            .set_session(token_with(&json!({"exp": 1000})), None)
            .unwrap();
        past_startup().await;

        assert!(f.monitor.check().await.performed());
        time::advance(Duration::from_secs(10)).await;

        // Expired on the wall clock, but not yet due: state is untouched.
        f.clock.set_epoch_seconds(5000);
        assert_eq!(f.monitor.check().await, CheckOutcome::Throttled);
        assert_eq!(f.monitor.state().await, LivenessState::Valid);
        assert!(f.store.is_authenticated());

        time::advance(Duration::from_secs(20)).await;
        assert!(matches!(
            f.monitor.check().await,
            CheckOutcome::Invalidated { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_timer_tick_does_not_throttle_the_next_one() {
        let f = fixture(200);
        f.store
            .set_session(token_with(&json!({"exp": 250})), None)
            .unwrap();

        past_startup().await;
        assert!(f.monitor.timer_check().await.performed());

        // The +32s tick wakes 3ms late.
        time::advance(Duration::from_millis(30_003)).await;
        assert!(f.monitor.timer_check().await.performed());

        // The +62s tick is on time, just under one interval after the late one.
        f.clock.set_epoch_seconds(300);
        time::advance(Duration::from_millis(29_997)).await;
        assert_eq!(f.monitor.check().await, CheckOutcome::Throttled);
        assert!(matches!(
            f.monitor.timer_check().await,
            CheckOutcome::Invalidated { .. }
        ));
        assert_eq!(f.handler.count(), 1);
        assert!(!f.store.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_check_still_waits_out_startup_delay() {
        let f = fixture(200);
        f.store
            .set_session(token_with(&json!({"exp": 100})), None)
            .unwrap();
        assert_eq!(f.monitor.timer_check().await, CheckOutcome::Deferred);
        assert_eq!(f.handler.count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_token_forces_logout_exactly_once() {
        let f = fixture(200);
        f.store
            .set_session(token_with(&json!({"exp": 100})), None)
            .unwrap();
        past_startup().await;

        let first = f.monitor.check().await;
        assert_eq!(
            first,
            CheckOutcome::Invalidated {
                reason: TokenRejection::Expired {
                    expired_at: chrono::DateTime::from_timestamp(100, 0).unwrap()
                }
            }
        );
        for _ in 0..3 {
            time::advance(Duration::from_millis(300)).await;
            assert!(!f.monitor.check().await.performed());
        }

        assert_eq!(f.handler.count(), 1);
        let notice = f.handler.last().unwrap();
        assert_eq!(notice.message, "Session expired. Please login again.");
        assert_eq!(notice.redirect_to, "/login");
        assert!(!f.store.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_token_is_treated_like_expiry() {
        let f = fixture(200);
        f.store.set_session("not-a-jwt", None).unwrap();
        past_startup().await;

        let outcome = f.monitor.check().await;
        assert_eq!(
            outcome,
            CheckOutcome::Invalidated {
                reason: TokenRejection::SegmentCount(1)
            }
        );
        assert_eq!(f.handler.count(), 1);
        assert!(!f.store.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_rejected_token_restored_does_not_notify_again() {
        let f = fixture(200);
        let token = token_with(&json!({"exp": 100}));
        f.store.set_session(token.clone(), None).unwrap();
        past_startup().await;
        assert!(f.monitor.check().await.performed());

        f.store.set_session(token.clone(), None).unwrap();
        time::advance(Duration::from_secs(60)).await;
        assert_eq!(f.monitor.check().await, CheckOutcome::AlreadyInvalid);
        assert_eq!(f.monitor.state().await, LivenessState::Invalid);
        assert_eq!(f.handler.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_token_rearms_and_can_notify_again() {
        let f = fixture(200);
        f.store
            .set_session(token_with(&json!({"exp": 100})), None)
            .unwrap();
        past_startup().await;
        f.monitor.check().await;
        assert_eq!(f.handler.count(), 1);

        f.store
            .set_session(token_with(&json!({"exp": 150})), None)
            .unwrap();
        assert_eq!(f.monitor.check().await, CheckOutcome::Deferred);
        assert_eq!(f.monitor.state().await, LivenessState::Armed);
        past_startup().await;
        f.monitor.check().await;
        assert_eq!(f.handler.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_forces_logout_and_stops_cleanly() {
        let f = fixture(200);
        let handle = f.monitor.start();
        tokio::task::yield_now().await;

        f.store
            .set_session(token_with(&json!({"exp": 230})), None)
            .unwrap();

        // Startup check at +2s passes; the token expires at epoch 230.
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(f.monitor.state().await, LivenessState::Valid);
        assert_eq!(f.handler.count(), 0);

        f.clock.set_epoch_seconds(240);
        time::sleep(Duration::from_secs(31)).await;
        assert_eq!(f.handler.count(), 1);
        assert!(!f.store.is_authenticated());

        time::sleep(Duration::from_secs(120)).await;
        assert_eq!(f.handler.count(), 1);
        assert_eq!(f.monitor.state().await, LivenessState::Idle);

        handle.stop().await;
    }
}
