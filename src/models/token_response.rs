use serde::{Deserialize, Serialize};

use super::auth_user_info::AuthUserInfo;

/// Token grant response from the auth endpoints (password, sign-up and
/// refresh grants all share this shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT access token for subsequent API calls.
    pub access_token: String,
    /// Token type, nominally "bearer".
    #[serde(default)]
    pub token_type: String,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: i64,
    /// Absolute expiry as a unix timestamp, when the backend provides it.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Refresh token for minting new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The user the grant was issued for.
    pub user: AuthUserInfo,
}
