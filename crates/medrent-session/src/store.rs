// SPDX-FileCopyrightText: 2026 Medrent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session store: single source of truth for "is a user logged in".
//!
//! State lives in a [`SessionState`] that is only ever replaced as a whole
//! value, so readers see either the old or the new session, never a mix.
//! Mutations are serialized by an async gate that is held while the token
//! backend is written, which keeps disk and memory in the same order.
//! Every transition is announced on a broadcast channel after the new state
//! is visible.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use medrent_core::{
    MedrentError, SessionEvent, SessionState, TokenPair, TokenStore, UserIdentity,
};
use secrecy::SecretString;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

/// Capacity of the session event channel.
const EVENT_CAPACITY: usize = 64;

/// Why a session is being cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearReason {
    /// The user asked to log out.
    Logout,
    /// Credentials were rejected and could not be renewed.
    AuthFailure(String),
}

/// Owns the in-memory session and its persisted tokens.
pub struct SessionStore {
    state: RwLock<SessionState>,
    backend: Arc<dyn TokenStore>,
    gate: Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("backend", &self.backend.name())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore {
    /// Creates an unauthenticated store over the given token backend.
    ///
    /// Persisted tokens are not read until [`SessionStore::begin_restore`].
    pub fn new(backend: Arc<dyn TokenStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(SessionState::Unauthenticated),
            backend,
            gate: Mutex::new(()),
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn announce(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Subscribe to session transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn current_user(&self) -> Option<UserIdentity> {
        self.read().user().cloned()
    }

    /// Tokens of the logged-in user. `None` unless authenticated, so they
    /// are present exactly when [`SessionStore::current_user`] is.
    pub fn tokens(&self) -> Option<TokenPair> {
        match &*self.read() {
            SessionState::Authenticated { tokens, .. } => Some(tokens.clone()),
            _ => None,
        }
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.tokens().map(|t| t.access)
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.tokens().and_then(|t| t.refresh)
    }

    /// Tokens to send with requests: those of the logged-in user, or the
    /// persisted ones while they are being verified at startup.
    pub fn credentials(&self) -> Option<TokenPair> {
        self.read().tokens().cloned()
    }

    /// Installs a freshly issued session (login or registration).
    ///
    /// Tokens are persisted first; the in-memory state then switches to
    /// `Authenticated` in a single write. If persistence fails the previous
    /// state is kept and the error returned.
    pub async fn establish(
        &self,
        tokens: TokenPair,
        user: UserIdentity,
    ) -> Result<(), MedrentError> {
        let _gate = self.gate.lock().await;
        self.backend.save(&tokens).await?;

        *self.write() = SessionState::Authenticated {
            tokens,
            user: user.clone(),
        };
        info!(user_id = user.id, role = %user.role, "session established");
        self.announce(SessionEvent::LoggedIn(user));
        Ok(())
    }

    /// Loads persisted tokens and enters `Restoring` if any exist.
    ///
    /// Returns `true` when there is something to validate. An already
    /// authenticated store is left untouched and reports `true`.
    pub async fn begin_restore(&self) -> Result<bool, MedrentError> {
        let _gate = self.gate.lock().await;
        if self.read().is_authenticated() {
            return Ok(true);
        }

        match self.backend.load().await? {
            Some(tokens) => {
                *self.write() = SessionState::Restoring { tokens };
                debug!("restoring persisted session");
                Ok(true)
            }
            None => {
                *self.write() = SessionState::Unauthenticated;
                Ok(false)
            }
        }
    }

    /// Promotes a `Restoring` session to `Authenticated` with the verified
    /// identity. Fails with `AuthExpired` if the session was cleared while
    /// the identity was being fetched.
    pub async fn complete_restore(&self, user: UserIdentity) -> Result<(), MedrentError> {
        let _gate = self.gate.lock().await;
        let mut state = self.write();
        let tokens = match &*state {
            SessionState::Restoring { tokens } | SessionState::Authenticated { tokens, .. } => {
                tokens.clone()
            }
            SessionState::Unauthenticated => {
                return Err(MedrentError::AuthExpired(
                    "session was cleared during restore".into(),
                ));
            }
        };
        *state = SessionState::Authenticated {
            tokens,
            user: user.clone(),
        };
        drop(state);

        info!(user_id = user.id, "persisted session restored");
        self.announce(SessionEvent::LoggedIn(user));
        Ok(())
    }

    /// Replaces the access token (and the refresh token when rotated),
    /// leaving the identity untouched.
    ///
    /// Fails with `AuthExpired` when there is no session to update. A
    /// persistence failure is logged; the in-memory session still carries
    /// the new token.
    pub async fn replace_access(
        &self,
        access: String,
        rotated_refresh: Option<String>,
    ) -> Result<(), MedrentError> {
        let _gate = self.gate.lock().await;
        let updated = {
            let mut state = self.write();
            let next = match &*state {
                SessionState::Unauthenticated => {
                    return Err(MedrentError::AuthExpired(
                        "no session to refresh".into(),
                    ));
                }
                SessionState::Restoring { tokens } => SessionState::Restoring {
                    tokens: renewed(tokens, access, rotated_refresh),
                },
                SessionState::Authenticated { tokens, user } => SessionState::Authenticated {
                    tokens: renewed(tokens, access, rotated_refresh),
                    user: user.clone(),
                },
            };
            *state = next;
            state.tokens().cloned()
        };

        if let Some(tokens) = updated
            && let Err(e) = self.backend.save(&tokens).await
        {
            warn!(error = %e, "failed to persist refreshed access token");
        }
        debug!("access token replaced");
        self.announce(SessionEvent::TokenRefreshed);
        Ok(())
    }

    /// Swaps in a new identity snapshot for the logged-in user.
    pub async fn replace_user(&self, user: UserIdentity) -> Result<(), MedrentError> {
        let _gate = self.gate.lock().await;
        let mut state = self.write();
        let tokens = match &*state {
            SessionState::Authenticated { tokens, .. } => tokens.clone(),
            _ => {
                return Err(MedrentError::Unauthorized(
                    "cannot update the profile without a session".into(),
                ));
            }
        };
        *state = SessionState::Authenticated {
            tokens,
            user: user.clone(),
        };
        drop(state);

        self.announce(SessionEvent::ProfileUpdated(user));
        Ok(())
    }

    /// Drops the session in memory and on disk.
    ///
    /// The in-memory state is cleared before the backend is touched, so a
    /// failing backend can never leave live credentials in the process. The
    /// backend error, if any, is still returned.
    pub async fn clear(&self, reason: ClearReason) -> Result<(), MedrentError> {
        let _gate = self.gate.lock().await;
        let was_present = {
            let mut state = self.write();
            let present = state.tokens().is_some();
            *state = SessionState::Unauthenticated;
            present
        };

        let persisted = self.backend.clear().await;
        if let Err(e) = &persisted {
            warn!(error = %e, "failed to remove persisted tokens");
        }

        match reason {
            ClearReason::Logout => {
                info!("session cleared by logout");
                self.announce(SessionEvent::LoggedOut);
            }
            ClearReason::AuthFailure(reason) => {
                if was_present {
                    warn!(%reason, "session cleared, login required");
                }
                self.announce(SessionEvent::LoginRequired { reason });
            }
        }
        persisted
    }
}

fn renewed(tokens: &TokenPair, access: String, rotated_refresh: Option<String>) -> TokenPair {
    TokenPair {
        access: SecretString::from(access),
        refresh: rotated_refresh
            .map(SecretString::from)
            .or_else(|| tokens.refresh.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryTokenStore;
    use medrent_core::Role;
    use secrecy::ExposeSecret;

    fn user() -> UserIdentity {
        UserIdentity {
            id: 1,
            email: "admin@example.org".into(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            role: Role::Admin,
            phone_number: None,
            address: None,
        }
    }

    fn store() -> (SessionStore, Arc<MemoryTokenStore>) {
        let backend = Arc::new(MemoryTokenStore::new());
        (SessionStore::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn establish_sets_tokens_and_user_together() {
        let (store, backend) = store();
        let mut events = store.subscribe();

        store
            .establish(TokenPair::new("a", Some("r".into())), user())
            .await
            .unwrap();

        assert!(store.is_authenticated());
        assert_eq!(store.current_user().unwrap().id, 1);
        assert_eq!(store.access_token().unwrap().expose_secret(), "a");
        assert!(backend.load().await.unwrap().is_some());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedIn(user()));
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let (store, backend) = store();
        store
            .establish(TokenPair::new("a", Some("r".into())), user())
            .await
            .unwrap();
        let mut events = store.subscribe();

        store.clear(ClearReason::Logout).await.unwrap();

        assert!(!store.is_authenticated());
        assert!(store.tokens().is_none());
        assert!(store.current_user().is_none());
        assert!(backend.load().await.unwrap().is_none());
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
    }

    #[tokio::test]
    async fn auth_failure_clear_announces_login_required() {
        let (store, _) = store();
        store.establish(TokenPair::new("a", None), user()).await.unwrap();
        let mut events = store.subscribe();

        store
            .clear(ClearReason::AuthFailure("refresh rejected".into()))
            .await
            .unwrap();
        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoginRequired {
                reason: "refresh rejected".into()
            }
        );
    }

    #[tokio::test]
    async fn replace_access_keeps_identity_and_refresh() {
        let (store, backend) = store();
        store
            .establish(TokenPair::new("old", Some("r".into())), user())
            .await
            .unwrap();

        store.replace_access("new".into(), None).await.unwrap();

        let tokens = store.tokens().unwrap();
        assert_eq!(tokens.access.expose_secret(), "new");
        assert_eq!(tokens.refresh.unwrap().expose_secret(), "r");
        assert_eq!(store.current_user().unwrap(), user());
        let persisted = backend.load().await.unwrap().unwrap();
        assert_eq!(persisted.access.expose_secret(), "new");
    }

    #[tokio::test]
    async fn replace_access_honors_rotation() {
        let (store, _) = store();
        store
            .establish(TokenPair::new("old", Some("r1".into())), user())
            .await
            .unwrap();
        store
            .replace_access("new".into(), Some("r2".into()))
            .await
            .unwrap();
        assert_eq!(store.refresh_token().unwrap().expose_secret(), "r2");
    }

    #[tokio::test]
    async fn replace_access_without_session_fails() {
        let (store, _) = store();
        let err = store.replace_access("new".into(), None).await.unwrap_err();
        assert!(matches!(err, MedrentError::AuthExpired(_)));
        assert!(store.tokens().is_none());
    }

    #[tokio::test]
    async fn restore_flow() {
        let backend = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new(
            "a",
            Some("r".into()),
        )));
        let store = SessionStore::new(backend);

        assert!(store.begin_restore().await.unwrap());
        assert!(!store.is_authenticated());
        assert!(store.current_user().is_none());
        assert!(store.access_token().is_none());
        assert_eq!(store.credentials().unwrap().access.expose_secret(), "a");

        store.complete_restore(user()).await.unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.access_token().unwrap().expose_secret(), "a");
    }

    #[tokio::test]
    async fn restore_with_empty_backend() {
        let (store, _) = store();
        assert!(!store.begin_restore().await.unwrap());
        assert!(store.tokens().is_none());
    }

    #[tokio::test]
    async fn complete_restore_after_clear_fails() {
        let backend = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("a", None)));
        let store = SessionStore::new(backend);
        store.begin_restore().await.unwrap();
        store
            .clear(ClearReason::AuthFailure("expired".into()))
            .await
            .unwrap();

        let err = store.complete_restore(user()).await.unwrap_err();
        assert!(matches!(err, MedrentError::AuthExpired(_)));
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn replace_user_requires_session() {
        let (store, _) = store();
        assert!(store.replace_user(user()).await.is_err());

        store.establish(TokenPair::new("a", None), user()).await.unwrap();
        let mut updated = user();
        updated.first_name = "Amazing".into();
        store.replace_user(updated.clone()).await.unwrap();
        assert_eq!(store.current_user().unwrap(), updated);
    }

    #[tokio::test]
    async fn user_present_iff_authenticated() {
        let backend = Arc::new(MemoryTokenStore::with_tokens(TokenPair::new("a", None)));
        let store = SessionStore::new(backend);
        let check = |s: &SessionStore| {
            assert_eq!(s.current_user().is_some(), s.is_authenticated());
            assert_eq!(s.access_token().is_some(), s.is_authenticated());
            assert_eq!(s.tokens().is_some(), s.is_authenticated());
        };
        check(&store);
        store.begin_restore().await.unwrap();
        check(&store);
        store.replace_access("b".into(), None).await.unwrap();
        check(&store);
        store.complete_restore(user()).await.unwrap();
        check(&store);
        store.establish(TokenPair::new("c", None), user()).await.unwrap();
        check(&store);
        store.replace_access("d".into(), None).await.unwrap();
        check(&store);
        store.clear(ClearReason::Logout).await.unwrap();
        check(&store);
        assert!(store.credentials().is_none());
    }
}
