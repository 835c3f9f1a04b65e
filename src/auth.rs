//! Request authentication for the hosted backend.
//!
//! Every request to the backend carries the project `apikey` header; requests
//! made on behalf of a signed-in user additionally carry an
//! `Authorization: Bearer <access token>` header. [`ApiAuth`] attaches the
//! right combination to an outgoing HTTP request.

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, TimeZone, Utc};

/// Credentials attached to backend HTTP requests.
///
/// # Examples
///
/// ```rust
/// use oqim_link::ApiAuth;
///
/// // Anonymous request (project API key only)
/// let auth = ApiAuth::api_key("public-anon-key");
///
/// // User-scoped request (API key plus the session's access token)
/// let auth = ApiAuth::bearer("public-anon-key", "eyJhbGc...");
/// ```
#[derive(Debug, Clone)]
pub enum ApiAuth {
    /// Project API key only (anonymous requests).
    ApiKey(String),

    /// Project API key plus a user access token.
    Bearer {
        /// Project API key.
        api_key: String,
        /// JWT access token of the signed-in user.
        access_token: String,
    },
}

impl ApiAuth {
    /// Anonymous request authentication (project API key only).
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey(key.into())
    }

    /// User-scoped request authentication.
    pub fn bearer(key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self::Bearer {
            api_key: key.into(),
            access_token: access_token.into(),
        }
    }

    /// Attach authentication headers to an HTTP request builder.
    ///
    /// - `ApiKey`: `apikey: <key>`
    /// - `Bearer`: `apikey: <key>` and `Authorization: Bearer <token>`
    pub fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::ApiKey(key) => request.header("apikey", key),
            Self::Bearer {
                api_key,
                access_token,
            } => request.header("apikey", api_key).bearer_auth(access_token),
        }
    }

    /// `true` when a user access token is attached.
    pub fn is_user_scoped(&self) -> bool {
        matches!(self, Self::Bearer { .. })
    }
}

/// Extract the `exp` claim from a JWT access token without verifying it.
///
/// The backend is the verifier; the client only needs the expiry to know when
/// to refresh. Returns `None` for anything that does not look like a JWT.
pub(crate) fn decode_token_expiry(access_token: &str) -> Option<DateTime<Utc>> {
    let payload = access_token.split('.').nth(1)?;
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?.as_i64()?;
    Utc.timestamp_opt(exp, 0).single()
}
