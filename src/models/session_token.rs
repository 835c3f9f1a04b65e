use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted backend session: the token pair plus the user it belongs to.
///
/// This is what a [`TokenStore`](crate::token_store::TokenStore) persists
/// between process runs so the next bootstrap can restore the session without
/// new credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Id of the signed-in user.
    pub user_id: String,
    /// JWT access token sent as the Bearer credential.
    pub access_token: String,
    /// Longer-lived token used to mint a new access token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// `true` when the access token is no longer valid at `now`.
    ///
    /// The boundary itself counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// `true` when the access token is no longer valid right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
