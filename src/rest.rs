//! HTTP implementation of [`IdentityProvider`] for the hosted backend.
//!
//! Talks to the backend's auth endpoints (`/auth/v1/...`) for credential
//! verification and session issuance, and to its table API
//! (`/rest/v1/profiles`) for the application-owned profile rows. Session
//! tokens are persisted through a [`TokenStore`] and change notifications are
//! fanned out on a broadcast channel shared by every subscriber.

use crate::{
    auth::{decode_token_expiry, ApiAuth},
    error::{OqimLinkError, Result},
    models::{
        AuthChange, NewProfile, PasswordGrant, Profile, ProfileUpdate, RefreshGrant, SessionToken,
        SignUpMetadata, SignUpRequest, TokenResponse,
    },
    provider::IdentityProvider,
    token_store::{MemoryTokenStore, TokenStore},
};
use chrono::{DateTime, TimeZone, Utc};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

const DEFAULT_CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Production [`IdentityProvider`] over HTTP.
///
/// Use [`RestIdentityProvider::builder`] to construct instances.
///
/// # Examples
///
/// ```rust,no_run
/// use oqim_link::RestIdentityProvider;
///
/// # fn example() -> oqim_link::Result<()> {
/// let provider = RestIdentityProvider::builder()
///     .base_url("https://project.oqim.tv")
///     .api_key("public-anon-key")
///     .timeout(std::time::Duration::from_secs(15))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct RestIdentityProvider {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
    token_store: Arc<dyn TokenStore>,
    current_token: RwLock<Option<SessionToken>>,
    change_tx: broadcast::Sender<AuthChange>,
}

impl RestIdentityProvider {
    /// Create a new builder for configuring the provider.
    pub fn builder() -> RestIdentityProviderBuilder {
        RestIdentityProviderBuilder::new()
    }

    fn auth_for(&self, token: Option<&SessionToken>) -> ApiAuth {
        match token {
            Some(token) => ApiAuth::bearer(&self.api_key, &token.access_token),
            None => ApiAuth::api_key(&self.api_key),
        }
    }

    /// Cache and persist a freshly issued token.
    async fn adopt_token(&self, token: &SessionToken) {
        *self.current_token.write().await = Some(token.clone());
        if let Err(e) = self.token_store.set(token).await {
            warn!("[AUTH] Failed to persist session token: {}", e);
        }
    }

    /// Drop the cached and persisted token.
    async fn forget_token(&self) {
        *self.current_token.write().await = None;
        if let Err(e) = self.token_store.clear().await {
            warn!("[AUTH] Failed to clear persisted session token: {}", e);
        }
    }

    fn emit(&self, change: AuthChange) {
        // Nobody subscribed yet is fine; the send result only says so.
        let _ = self.change_tx.send(change);
    }

    /// POST a grant request to an auth endpoint and convert the response.
    async fn send_token_request<B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<SessionToken> {
        debug!("[AUTH_HTTP] Sending POST to {}", url);
        let start = std::time::Instant::now();
        let response = self
            .http_client
            .post(url)
            .header("apikey", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        debug!(
            "[AUTH_HTTP] Response received: status={} duration_ms={}",
            status,
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = extract_error_message(&body_text).unwrap_or(body_text);
            return Err(auth_endpoint_error(status.as_u16(), message));
        }

        let token_response: TokenResponse = response.json().await?;
        Ok(session_token_from(token_response, Utc::now()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<SessionToken> {
        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.base_url);
        let grant = RefreshGrant {
            refresh_token: refresh_token.to_string(),
        };
        let token = self.send_token_request(&url, &grant).await?;
        self.adopt_token(&token).await;
        Ok(token)
    }

    fn profiles_url(&self) -> String {
        format!("{}/rest/v1/profiles", self.base_url)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn current_session(&self) -> Result<Option<SessionToken>> {
        let cached = self.current_token.read().await.clone();
        let candidate = match cached {
            Some(token) => Some(token),
            None => match self.token_store.get().await {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("[AUTH] Failed to read persisted session token: {}", e);
                    None
                },
            },
        };

        let Some(token) = candidate else {
            debug!("[AUTH] No stored session");
            return Ok(None);
        };

        if !token.is_expired() {
            *self.current_token.write().await = Some(token.clone());
            return Ok(Some(token));
        }

        let Some(refresh_token) = token.refresh_token.clone() else {
            debug!("[AUTH] Stored session expired with no refresh token");
            self.forget_token().await;
            return Ok(None);
        };

        debug!("[AUTH] Stored session expired, refreshing");
        match self.refresh_session(&refresh_token).await {
            Ok(fresh) => {
                self.emit(AuthChange::TokenRefreshed(fresh.clone()));
                Ok(Some(fresh))
            },
            // A rejected refresh token is dead for good; transport failures
            // keep the stored token so a later bootstrap can retry.
            Err(OqimLinkError::AuthenticationError(message)) => {
                warn!("[AUTH] Refresh token rejected: {}", message);
                self.forget_token().await;
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.change_tx.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionToken> {
        debug!("[AUTH] Signing in '{}'", email);
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let grant = PasswordGrant {
            email: email.to_string(),
            password: password.to_string(),
        };

        let token = self.send_token_request(&url, &grant).await?;
        self.adopt_token(&token).await;
        self.emit(AuthChange::SignedIn(token.clone()));
        Ok(token)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SessionToken> {
        debug!("[AUTH] Creating account for '{}'", email);
        let url = format!("{}/auth/v1/signup", self.base_url);
        let request = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            data: metadata,
        };

        let token = self.send_token_request(&url, &request).await?;
        self.adopt_token(&token).await;
        self.emit(AuthChange::SignedIn(token.clone()));
        Ok(token)
    }

    async fn sign_out(&self) -> Result<()> {
        let token = self.current_token.read().await.clone();

        let result = match &token {
            Some(token) => {
                let url = format!("{}/auth/v1/logout", self.base_url);
                debug!("[AUTH_HTTP] Sending POST to {}", url);
                let request = self
                    .auth_for(Some(token))
                    .apply_to_request(self.http_client.post(&url));
                match request.send().await {
                    Ok(response) if response.status().is_success() => Ok(()),
                    Ok(response) => {
                        let status = response.status().as_u16();
                        let body_text = response.text().await.unwrap_or_default();
                        let message =
                            extract_error_message(&body_text).unwrap_or_else(|| body_text.clone());
                        warn!("[AUTH] Remote sign-out failed ({}): {}", status, message);
                        Err(OqimLinkError::ServerError {
                            status_code: status,
                            message,
                        })
                    },
                    Err(e) => {
                        warn!("[AUTH] Remote sign-out failed: {}", e);
                        Err(e.into())
                    },
                }
            },
            None => Ok(()),
        };

        // Local state always ends signed out, whatever the backend said.
        self.forget_token().await;
        self.emit(AuthChange::SignedOut);
        result
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let token = self.current_token.read().await.clone();
        let url = format!(
            "{}?select=*&id=eq.{}&limit=1",
            self.profiles_url(),
            user_id
        );
        debug!("[PROFILE_HTTP] Sending GET to {}", url);

        let request = self
            .auth_for(token.as_ref())
            .apply_to_request(self.http_client.get(&url));
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(table_endpoint_error(status.as_u16(), body_text));
        }

        let mut rows: Vec<Profile> = response.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn insert_profile(&self, profile: &NewProfile) -> Result<()> {
        let token = self.current_token.read().await.clone();
        let url = self.profiles_url();
        debug!("[PROFILE_HTTP] Sending POST to {}", url);

        let request = self
            .auth_for(token.as_ref())
            .apply_to_request(self.http_client.post(&url))
            .header("Prefer", "return=minimal")
            .json(profile);
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(table_endpoint_error(status.as_u16(), body_text));
        }
        Ok(())
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()> {
        if update.is_empty() {
            return Ok(());
        }

        let token = self.current_token.read().await.clone();
        let url = format!("{}?id=eq.{}", self.profiles_url(), user_id);
        debug!("[PROFILE_HTTP] Sending PATCH to {}", url);

        let request = self
            .auth_for(token.as_ref())
            .apply_to_request(self.http_client.patch(&url))
            .header("Prefer", "return=minimal")
            .json(update);
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(table_endpoint_error(status.as_u16(), body_text));
        }
        Ok(())
    }
}

/// Builder for configuring [`RestIdentityProvider`] instances.
pub struct RestIdentityProviderBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
    token_store: Option<Arc<dyn TokenStore>>,
}

impl RestIdentityProviderBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout: Duration::from_secs(30),
            token_store: None,
        }
    }

    /// Set the backend project URL (required).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the project API key sent with every request (required).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the session-token storage backend.
    ///
    /// Defaults to [`MemoryTokenStore`] (sessions do not survive a restart).
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Build the provider.
    pub fn build(self) -> Result<RestIdentityProvider> {
        let base_url = self
            .base_url
            .ok_or_else(|| OqimLinkError::ConfigurationError("base_url is required".into()))?
            .trim_end_matches('/')
            .to_string();
        let api_key = self
            .api_key
            .ok_or_else(|| OqimLinkError::ConfigurationError("api_key is required".into()))?;

        // Keep-alive pooling: the store issues short bursts of requests
        // (token grant followed by a profile fetch) against one host.
        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| OqimLinkError::ConfigurationError(e.to_string()))?;

        let (change_tx, _) = broadcast::channel(DEFAULT_CHANGE_CHANNEL_CAPACITY);

        Ok(RestIdentityProvider {
            base_url,
            api_key,
            http_client,
            token_store: self
                .token_store
                .unwrap_or_else(|| Arc::new(MemoryTokenStore::new())),
            current_token: RwLock::new(None),
            change_tx,
        })
    }
}

/// Convert a token grant response into the SDK's session token.
///
/// Expiry precedence: the response's absolute `expires_at`, then the JWT's
/// own `exp` claim, then `now + expires_in`.
fn session_token_from(response: TokenResponse, now: DateTime<Utc>) -> SessionToken {
    let expires_at = response
        .expires_at
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .or_else(|| decode_token_expiry(&response.access_token))
        .unwrap_or_else(|| now + chrono::Duration::seconds(response.expires_in.max(0)));

    SessionToken {
        user_id: response.user.id,
        access_token: response.access_token,
        refresh_token: response.refresh_token,
        expires_at,
    }
}

/// Pull a human-readable message out of a backend error body.
///
/// The auth and table endpoints use different field names across versions;
/// try them all before falling back to the raw body.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    for key in ["error_description", "msg", "message", "error"] {
        if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }
    None
}

fn auth_endpoint_error(status_code: u16, message: String) -> OqimLinkError {
    match status_code {
        400 | 401 | 403 | 422 => OqimLinkError::AuthenticationError(message),
        _ => OqimLinkError::ServerError {
            status_code,
            message,
        },
    }
}

fn table_endpoint_error(status_code: u16, body_text: String) -> OqimLinkError {
    let message = extract_error_message(&body_text).unwrap_or(body_text);
    match status_code {
        401 | 403 => OqimLinkError::AuthenticationError(message),
        _ => OqimLinkError::ServerError {
            status_code,
            message,
        },
    }
}
