//! The identity-provider boundary.
//!
//! Everything the session store needs from the managed backend is expressed
//! as one trait so test doubles (and future transports) can stand in for the
//! HTTP implementation. The production implementation is
//! [`RestIdentityProvider`](crate::rest::RestIdentityProvider).

use crate::error::Result;
use crate::models::{AuthChange, NewProfile, Profile, ProfileUpdate, SessionToken, SignUpMetadata};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Operations the session store delegates to the identity/profile backend.
///
/// Credential verification, session issuance and profile persistence all
/// live behind this trait; the store only orchestrates calls and publishes
/// the resulting session state.
///
/// # Example
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
/// # Ok(())
/// # }
/// ```
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Restore the persisted session, refreshing the access token if needed.
    ///
    /// Returns `Ok(None)` when no session is stored or the stored one can no
    /// longer be refreshed.
    async fn current_session(&self) -> Result<Option<SessionToken>>;

    /// Subscribe to session-change notifications.
    ///
    /// Each subscriber gets every [`AuthChange`] emitted after the call.
    /// Unsubscribing is dropping the receiver.
    fn subscribe_changes(&self) -> broadcast::Receiver<AuthChange>;

    /// Verify credentials and open a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionToken>;

    /// Create a new account and open a session for it.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SessionToken>;

    /// End the current session.
    async fn sign_out(&self) -> Result<()>;

    /// Fetch the profile row for a user id; `Ok(None)` when no row exists.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Insert a fresh profile row.
    async fn insert_profile(&self, profile: &NewProfile) -> Result<()>;

    /// Apply a partial update to the profile row of `user_id`.
    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()>;
}

/// A reference-counted [`IdentityProvider`] trait object.
pub type ArcIdentityProvider = Arc<dyn IdentityProvider>;
