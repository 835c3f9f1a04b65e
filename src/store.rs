//! The process-wide session store.
//!
//! [`AuthStore`] owns the published [`Session`] value: it bootstraps from the
//! identity provider, re-publishes on every provider change notification,
//! and exposes the sign-in/sign-up/sign-out/profile operations the UI calls.
//! State is published through a `watch` channel — every transition replaces
//! the whole `Session`, so readers always observe a complete value and
//! concurrent writes resolve as last-write-wins.

use crate::{
    error::{OqimLinkError, Result},
    models::{Language, NewProfile, ProfileUpdate, Session, SignUpMetadata},
    provider::ArcIdentityProvider,
};
use chrono::Utc;
use log::{debug, error, warn};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex as StdMutex,
};
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;

/// Process-wide authentication state container.
///
/// Construct one per application, share it (typically inside an `Arc`) with
/// every component that needs session state, and call [`initialize`] exactly
/// once at startup. Consumers read the current [`Session`] via [`session`] or
/// follow transitions via [`subscribe`].
///
/// [`initialize`]: AuthStore::initialize
/// [`session`]: AuthStore::session
/// [`subscribe`]: AuthStore::subscribe
///
/// # Examples
///
/// ```rust,no_run
/// use oqim_link::{AuthStore, RestIdentityProvider};
/// use std::sync::Arc;
///
/// # async fn example() -> oqim_link::Result<()> {
/// let provider = RestIdentityProvider::builder()
///     .base_url("https://project.oqim.tv")
///     .api_key("public-anon-key")
///     .build()?;
///
/// let store = AuthStore::new(Arc::new(provider));
/// store.initialize().await?;
///
/// if let Err(e) = store.login("viewer@example.com", "secret").await {
///     eprintln!("login rejected: {}", e);
/// }
///
/// if store.can_watch() {
///     // start playback
/// }
/// # Ok(())
/// # }
/// ```
pub struct AuthStore {
    provider: ArcIdentityProvider,
    session_tx: Arc<watch::Sender<Session>>,
    default_language: Language,
    initialized: AtomicBool,
    listener_shutdown: StdMutex<Option<oneshot::Sender<()>>>,
    _listener_handle: StdMutex<Option<JoinHandle<()>>>,
}

impl AuthStore {
    /// Create a store backed by the given identity provider.
    ///
    /// The session starts as [`SessionStatus::Uninitialized`] until
    /// [`initialize`](AuthStore::initialize) runs.
    ///
    /// [`SessionStatus::Uninitialized`]: crate::SessionStatus::Uninitialized
    pub fn new(provider: ArcIdentityProvider) -> Self {
        let (session_tx, _) = watch::channel(Session::uninitialized());
        Self {
            provider,
            session_tx: Arc::new(session_tx),
            default_language: Language::default(),
            initialized: AtomicBool::new(false),
            listener_shutdown: StdMutex::new(None),
            _listener_handle: StdMutex::new(None),
        }
    }

    /// Set the language stamped on profiles created through
    /// [`register`](AuthStore::register).
    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    /// Bootstrap the session and start following provider notifications.
    ///
    /// Queries the provider for an existing session; when one is found the
    /// matching profile is fetched and an authenticated session published,
    /// otherwise (including on any provider failure) the session resolves to
    /// anonymous — bootstrap never fails into a stuck loading state.
    ///
    /// Also spawns the background task that re-runs the same fetch-and-publish
    /// logic on every provider change notification (sign-in from another
    /// client, token refresh, sign-out) until the store is dropped or
    /// [`close`](AuthStore::close)d.
    ///
    /// Must be called exactly once; a second call is rejected and does not
    /// register a second listener.
    pub async fn initialize(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(OqimLinkError::ConfigurationError(
                "auth store is already initialized".into(),
            ));
        }

        debug!("[SESSION] Bootstrap starting");
        self.session_tx.send_replace(Session::loading());

        match self.provider.current_session().await {
            Ok(Some(token)) => {
                resolve_and_publish(&self.provider, &self.session_tx, &token.user_id).await;
            },
            Ok(None) => {
                debug!("[SESSION] No existing session");
                self.session_tx.send_replace(Session::anonymous());
            },
            Err(e) => {
                warn!("[SESSION] Bootstrap failed, treating as signed out: {}", e);
                self.session_tx.send_replace(Session::anonymous());
            },
        }

        let changes = self.provider.subscribe_changes();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(change_listener(
            self.provider.clone(),
            Arc::clone(&self.session_tx),
            changes,
            shutdown_rx,
        ));

        if let Ok(mut guard) = self.listener_shutdown.lock() {
            *guard = Some(shutdown_tx);
        }
        if let Ok(mut guard) = self._listener_handle.lock() {
            *guard = Some(handle);
        }

        Ok(())
    }

    /// Sign in with email and password.
    ///
    /// On success the profile is fetched and an authenticated session
    /// published. On any failure the published session is left exactly as it
    /// was and the provider's message is returned; no retry is attempted —
    /// prompting the user again is the caller's call.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        if email.is_empty() || password.is_empty() {
            return Err(OqimLinkError::AuthenticationError(
                "email and password must not be empty".into(),
            ));
        }

        let token = self.provider.sign_in_with_password(email, password).await?;

        match self.provider.fetch_profile(&token.user_id).await? {
            Some(profile) => {
                debug!("[SESSION] Signed in as user {}", profile.id);
                self.session_tx.send_replace(Session::authenticated(profile));
                Ok(())
            },
            None => Err(OqimLinkError::AuthenticationError(
                "no profile exists for this account".into(),
            )),
        }
    }

    /// Create an account and sign it in.
    ///
    /// Inserts the default profile row (empty wallet, no subscription, no
    /// admin access, the store's default language) for the new account. When
    /// the insert fails the store checks whether the backend created the row
    /// itself (some deployments do, via trigger); if no row exists anywhere
    /// it signs the half-created account back out instead of publishing an
    /// authenticated session without entitlements, and returns the insert
    /// error.
    pub async fn register(&self, email: &str, password: &str, display_name: &str) -> Result<()> {
        if email.is_empty() || password.is_empty() {
            return Err(OqimLinkError::AuthenticationError(
                "email and password must not be empty".into(),
            ));
        }

        let metadata = if display_name.is_empty() {
            SignUpMetadata::default()
        } else {
            SignUpMetadata::with_display_name(display_name)
        };
        let token = self.provider.sign_up(email, password, metadata).await?;

        let display = (!display_name.is_empty()).then(|| display_name.to_string());
        let row = NewProfile::new(token.user_id.clone(), email, display, self.default_language);
        let insert_result = self.provider.insert_profile(&row).await;
        if let Err(e) = &insert_result {
            error!("[SESSION] Profile insert failed after sign-up: {}", e);
        }

        match self.provider.fetch_profile(&token.user_id).await {
            Ok(Some(profile)) => {
                debug!("[SESSION] Registered user {}", profile.id);
                self.session_tx.send_replace(Session::authenticated(profile));
                Ok(())
            },
            fetch_outcome => {
                let error = insert_result.err().unwrap_or_else(|| match fetch_outcome {
                    Err(e) => e,
                    _ => OqimLinkError::InternalError(
                        "profile row missing right after insert".into(),
                    ),
                });
                warn!("[SESSION] Registration left no usable profile, signing back out");
                if let Err(e) = self.provider.sign_out().await {
                    warn!("[SESSION] Compensating sign-out failed: {}", e);
                }
                self.session_tx.send_replace(Session::anonymous());
                Err(error)
            },
        }
    }

    /// Sign out.
    ///
    /// The provider call is attempted but its outcome is irrelevant to local
    /// state: the published session always ends anonymous.
    pub async fn logout(&self) {
        debug!("[SESSION] Signing out");
        if let Err(e) = self.provider.sign_out().await {
            warn!("[SESSION] Provider sign-out failed: {}", e);
        }
        self.session_tx.send_replace(Session::anonymous());
    }

    /// Persist a partial profile update for the signed-in user.
    ///
    /// Rejected locally (no provider round-trip) when no user is signed in.
    /// On success the supplied fields are merged into the in-memory profile
    /// and the session republished; on failure the in-memory profile is left
    /// unchanged.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<()> {
        let current = self.session_tx.borrow().clone();
        let Some(profile) = current.profile() else {
            return Err(OqimLinkError::NotAuthenticated);
        };

        self.provider.update_profile(&profile.id, &update).await?;

        let mut merged = profile.clone();
        update.apply_to(&mut merged);
        self.session_tx.send_replace(Session::authenticated(merged));
        Ok(())
    }

    /// Snapshot of the currently published session.
    pub fn session(&self) -> Session {
        self.session_tx.borrow().clone()
    }

    /// Follow session transitions.
    ///
    /// The receiver sees every published session from the moment of the call;
    /// dropping it unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session_tx.subscribe()
    }

    /// `true` when a user is currently signed in.
    pub fn is_authenticated(&self) -> bool {
        self.session_tx.borrow().is_authenticated()
    }

    /// Whether the current session may watch paid content right now.
    ///
    /// Evaluates [`Session::can_watch_at`] at the current wall-clock time.
    pub fn can_watch(&self) -> bool {
        self.session_tx.borrow().can_watch_at(Utc::now())
    }

    /// Stop the background change listener.
    ///
    /// Safe to call multiple times; also runs on drop.
    pub fn close(&self) {
        if let Ok(mut guard) = self.listener_shutdown.lock() {
            if let Some(tx) = guard.take() {
                let _ = tx.send(());
            }
        }
    }
}

impl Drop for AuthStore {
    fn drop(&mut self) {
        self.close();
    }
}

/// Fetch the profile for `user_id` and publish the resulting session.
///
/// Shared by bootstrap and the change listener: a missing profile or a fetch
/// failure resolves to anonymous rather than an error.
async fn resolve_and_publish(
    provider: &ArcIdentityProvider,
    session_tx: &watch::Sender<Session>,
    user_id: &str,
) {
    match provider.fetch_profile(user_id).await {
        Ok(Some(profile)) => {
            debug!("[SESSION] Publishing authenticated session for user {}", profile.id);
            session_tx.send_replace(Session::authenticated(profile));
        },
        Ok(None) => {
            warn!(
                "[SESSION] No profile row for user {}, treating as signed out",
                user_id
            );
            session_tx.send_replace(Session::anonymous());
        },
        Err(e) => {
            warn!("[SESSION] Profile fetch failed, treating as signed out: {}", e);
            session_tx.send_replace(Session::anonymous());
        },
    }
}

/// Background task: re-run fetch-and-publish on every provider notification.
async fn change_listener(
    provider: ArcIdentityProvider,
    session_tx: Arc<watch::Sender<Session>>,
    mut changes: broadcast::Receiver<crate::models::AuthChange>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                debug!("[SESSION] Change listener shutting down");
                break;
            },
            change = changes.recv() => match change {
                Ok(change) => match change.session_token() {
                    Some(token) => {
                        let user_id = token.user_id.clone();
                        resolve_and_publish(&provider, &session_tx, &user_id).await;
                    },
                    None => {
                        debug!("[SESSION] Provider reported sign-out");
                        session_tx.send_replace(Session::anonymous());
                    },
                },
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(
                        "[SESSION] Change listener lagged, {} notifications dropped",
                        missed
                    );
                },
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("[SESSION] Change channel closed");
                    break;
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionStatus;
    use crate::rest::RestIdentityProvider;

    /// Store backed by a REST provider pointing at nothing — good enough for
    /// the paths that never reach the network.
    fn make_store() -> AuthStore {
        let provider = RestIdentityProvider::builder()
            .base_url("http://localhost:54321")
            .api_key("anon")
            .build()
            .expect("builder should succeed");
        AuthStore::new(Arc::new(provider))
    }

    #[test]
    fn test_fresh_store_is_uninitialized() {
        let store = make_store();
        assert_eq!(store.session().status(), SessionStatus::Uninitialized);
        assert!(!store.is_authenticated());
        assert!(!store.can_watch(), "nothing is watchable before bootstrap");
    }

    #[tokio::test]
    async fn test_login_rejects_empty_credentials_locally() {
        let store = make_store();
        let err = store.login("", "secret").await.unwrap_err();
        assert!(matches!(err, OqimLinkError::AuthenticationError(_)));

        let err = store.login("viewer@example.com", "").await.unwrap_err();
        assert!(matches!(err, OqimLinkError::AuthenticationError(_)));

        assert_eq!(
            store.session().status(),
            SessionStatus::Uninitialized,
            "rejected login must not touch the session"
        );
    }

    #[tokio::test]
    async fn test_update_profile_rejected_without_session() {
        let store = make_store();
        let err = store
            .update_profile(ProfileUpdate::new().display_name("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, OqimLinkError::NotAuthenticated));
    }

    #[test]
    fn test_close_is_idempotent() {
        let store = make_store();
        store.close();
        store.close();
    }
}
