//! Process-wide session store.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use coursehub_core::error::{AppError, ErrorKind};
use coursehub_core::result::AppResult;
use coursehub_core::traits::KeyValueStorage;
use coursehub_entity::session::{Session, token_fingerprint};
use coursehub_entity::user::UserIdentity;

use crate::storage::MemoryStorage;

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key holding the serialized user record.
pub const USER_KEY: &str = "user";

/// Single source of truth for the current session.
///
/// Reads are synchronous. Every mutation reaches durable storage before it
/// becomes visible in memory; a failed write leaves the in-memory session
/// untouched. Consumers that need to react to changes (the liveness monitor,
/// the notification poller) hold a [`watch::Receiver`] from [`subscribe`].
///
/// [`subscribe`]: SessionStore::subscribe
#[derive(Debug)]
pub struct SessionStore {
    /// Durable backing storage.
    storage: Arc<dyn KeyValueStorage>,
    /// Current session, broadcast to subscribers.
    state: watch::Sender<Session>,
    /// Keeps storage and memory updates in the same order.
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Open the store, hydrating from durable storage.
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> AppResult<Self> {
        let session = Self::hydrate(storage.as_ref())?;
        if let Some(token) = session.token() {
            tracing::info!(
                token = %token_fingerprint(token),
                has_user = session.user().is_some(),
                "Restored persisted session"
            );
        }

        let (state, _) = watch::channel(session);
        Ok(Self {
            storage,
            state,
            write_lock: Mutex::new(()),
        })
    }

    /// An empty store backed by process memory.
    pub fn in_memory() -> Self {
        let (state, _) = watch::channel(Session::empty());
        Self {
            storage: Arc::new(MemoryStorage::new()),
            state,
            write_lock: Mutex::new(()),
        }
    }

    fn hydrate(storage: &dyn KeyValueStorage) -> AppResult<Session> {
        let token = match storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) if e.kind == ErrorKind::Storage => {
                tracing::warn!("Persisted session is unreadable, starting logged out: {}", e);
                return Ok(Session::empty());
            }
            Err(e) => return Err(e),
        };

        let Some(token) = token else {
            if storage.get(USER_KEY)?.is_some() {
                tracing::warn!("Persisted user without a token, ignoring it");
            }
            return Ok(Session::empty());
        };

        let user = match storage.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<UserIdentity>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Persisted user record is unreadable, dropping it: {}", e);
                    None
                }
            },
            None => None,
        };

        Ok(Session::new(token, user))
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// The current token, if any.
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(str::to_owned)
    }

    /// The current user, if loaded.
    pub fn user(&self) -> Option<UserIdentity> {
        self.state.borrow().user().cloned()
    }

    /// Whether a token is held.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Receive every subsequent session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Store a new session. No validation is done on the values.
    pub fn set_session(
        &self,
        token: impl Into<String>,
        user: Option<UserIdentity>,
    ) -> AppResult<()> {
        let token = token.into();
        let _guard = self.lock()?;

        match &user {
            Some(user) => {
                let user_json = serde_json::to_string(user)?;
                self.storage.commit(
                    &[(TOKEN_KEY, token.as_str()), (USER_KEY, user_json.as_str())],
                    &[],
                )?;
            }
            None => {
                self.storage.commit(&[(TOKEN_KEY, token.as_str())], &[USER_KEY])?;
            }
        }

        tracing::info!(
            token = %token_fingerprint(&token),
            user = user.as_ref().map(|u| u.id.as_str()).unwrap_or("-"),
            "Session stored"
        );
        self.state.send_replace(Session::new(token, user));
        Ok(())
    }

    /// Attach the user record to the token already held.
    pub fn set_user(&self, user: UserIdentity) -> AppResult<()> {
        let _guard = self.lock()?;

        let mut session = self.session();
        if session.token().is_none() {
            return Err(AppError::session("Cannot store a user without a session token"));
        }

        let user_json = serde_json::to_string(&user)?;
        self.storage.commit(&[(USER_KEY, user_json.as_str())], &[])?;

        session.with_user(user);
        self.state.send_replace(session);
        Ok(())
    }

    /// Remove the session from memory and durable storage.
    ///
    /// Clearing an already empty store does nothing and notifies no one.
    pub fn clear_session(&self) -> AppResult<()> {
        let _guard = self.lock()?;

        if self.state.borrow().is_empty() {
            return Ok(());
        }

        self.storage.commit(&[], &[TOKEN_KEY, USER_KEY])?;
        self.state.send_replace(Session::empty());
        tracing::info!("Session cleared");
        Ok(())
    }

    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| AppError::internal("Session store lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use coursehub_entity::user::UserRole;

    use super::*;

    fn user() -> UserIdentity {
        UserIdentity {
            id: "u42".into(),
            name: "Lin".into(),
            email: Some("lin@example.com".into()),
            role: UserRole::Instructor,
        }
    }

    /// Storage whose writes always fail.
    #[derive(Debug)]
    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }

        fn commit(&self, _set: &[(&str, &str)], _remove: &[&str]) -> AppResult<()> {
            Err(AppError::storage("read-only"))
        }
    }

    #[test]
    fn test_set_session_persists_before_returning() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::open(storage.clone()).unwrap();

        store.set_session("h.p.s", Some(user())).unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("h.p.s"));
        let persisted: UserIdentity =
            serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted, user());
        assert_eq!(store.token().as_deref(), Some("h.p.s"));
        assert_eq!(store.user(), Some(user()));
    }

    #[test]
    fn test_clear_session_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::open(storage.clone()).unwrap();
        store.set_session("h.p.s", Some(user())).unwrap();

        store.clear_session().unwrap();
        let after_once = store.session();
        store.clear_session().unwrap();

        assert_eq!(store.session(), after_once);
        assert!(store.session().is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clear_on_empty_store_does_not_notify() {
        let store = SessionStore::in_memory();
        let rx = store.subscribe();
        store.clear_session().unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_open_restores_persisted_session() {
        let user_json = serde_json::to_string(&user()).unwrap();
        let storage = Arc::new(MemoryStorage::with_entries(&[
            (TOKEN_KEY, "h.p.s"),
            (USER_KEY, user_json.as_str()),
        ]));

        let store = SessionStore::open(storage).unwrap();
        assert_eq!(store.token().as_deref(), Some("h.p.s"));
        assert_eq!(store.user().map(|u| u.role), Some(UserRole::Instructor));
    }

    #[test]
    fn test_open_drops_user_without_token_and_corrupt_user() {
        let orphan = Arc::new(MemoryStorage::with_entries(&[(USER_KEY, "{}")]));
        let store = SessionStore::open(orphan).unwrap();
        assert!(store.session().is_empty());

        let corrupt = Arc::new(MemoryStorage::with_entries(&[
            (TOKEN_KEY, "h.p.s"),
            (USER_KEY, "{broken"),
        ]));
        let store = SessionStore::open(corrupt).unwrap();
        assert_eq!(store.token().as_deref(), Some("h.p.s"));
        assert!(store.user().is_none());
    }

    #[test]
    fn test_token_without_user_removes_stale_user_entry() {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::open(storage.clone()).unwrap();
        store.set_session("old.t.k", Some(user())).unwrap();

        store.set_session("new.t.k", None).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert!(store.user().is_none());

        store.set_user(user()).unwrap();
        assert_eq!(store.user(), Some(user()));
        assert!(storage.get(USER_KEY).unwrap().is_some());
    }

    #[test]
    fn test_set_user_without_token_fails() {
        let store = SessionStore::in_memory();
        let err = store.set_user(user()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Session);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let store = SessionStore::open(Arc::new(ReadOnlyStorage)).unwrap();
        let err = store.set_session("h.p.s", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::open(Arc::new(crate::storage::FileStorage::new(&path))).unwrap();
        store.set_session("h.p.s", Some(user())).unwrap();
        drop(store);

        let reopened =
            SessionStore::open(Arc::new(crate::storage::FileStorage::new(&path))).unwrap();
        assert_eq!(reopened.user(), Some(user()));

        reopened.clear_session().unwrap();
        let again = SessionStore::open(Arc::new(crate::storage::FileStorage::new(&path))).unwrap();
        assert!(again.session().is_empty());
    }

    #[test]
    fn test_corrupt_session_file_opens_logged_out_and_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{truncated").unwrap();

        let store = SessionStore::open(Arc::new(crate::storage::FileStorage::new(&path))).unwrap();
        assert!(store.session().is_empty());
        store.clear_session().unwrap();

        store.set_session("h.p.s", Some(user())).unwrap();
        let reopened =
            SessionStore::open(Arc::new(crate::storage::FileStorage::new(&path))).unwrap();
        assert_eq!(reopened.token().as_deref(), Some("h.p.s"));
        assert_eq!(reopened.user(), Some(user()));
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();

        store.set_session("h.p.s", None).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().token(), Some("h.p.s"));

        store.clear_session().unwrap();
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }
}
