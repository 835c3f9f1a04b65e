use super::session_token::SessionToken;

/// Session-change notification pushed by the identity provider.
///
/// Fires on sign-in or sign-out from any origin and on token refresh. The
/// session store re-runs its fetch-and-publish logic on every notification,
/// so consumers converge no matter which client instance triggered the
/// change.
#[derive(Debug, Clone)]
pub enum AuthChange {
    /// A user signed in.
    SignedIn(SessionToken),
    /// The current session's access token was refreshed.
    TokenRefreshed(SessionToken),
    /// The session ended.
    SignedOut,
}

impl AuthChange {
    /// The session token carried by this change, if any.
    pub fn session_token(&self) -> Option<&SessionToken> {
        match self {
            Self::SignedIn(token) | Self::TokenRefreshed(token) => Some(token),
            Self::SignedOut => None,
        }
    }

    /// `true` for the sign-out notification.
    pub fn is_signed_out(&self) -> bool {
        matches!(self, Self::SignedOut)
    }
}
