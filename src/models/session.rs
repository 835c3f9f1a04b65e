use super::profile::Profile;

/// Where the process-wide session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Process started, bootstrap not begun.
    Uninitialized,
    /// Bootstrap in flight.
    Loading,
    /// A signed-in user with a loaded profile.
    Authenticated,
    /// No signed-in user.
    Anonymous,
}

/// The published authentication state consumed by the UI.
///
/// A profile is present exactly when the status is
/// [`SessionStatus::Authenticated`] — the constructors enforce this, so
/// readers never observe a half-built value. Sessions are replaced whole on
/// every transition, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    status: SessionStatus,
    profile: Option<Profile>,
}

impl Session {
    /// Session before bootstrap has begun.
    pub fn uninitialized() -> Self {
        Self {
            status: SessionStatus::Uninitialized,
            profile: None,
        }
    }

    /// Session while bootstrap is in flight.
    pub fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            profile: None,
        }
    }

    /// Logged-out session.
    pub fn anonymous() -> Self {
        Self {
            status: SessionStatus::Anonymous,
            profile: None,
        }
    }

    /// Signed-in session carrying a freshly fetched profile.
    pub fn authenticated(profile: Profile) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            profile: Some(profile),
        }
    }

    /// Current status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The signed-in user's profile, present iff authenticated.
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// `true` when a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// `true` while bootstrap has not resolved yet.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.status,
            SessionStatus::Uninitialized | SessionStatus::Loading
        )
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::uninitialized()
    }
}
