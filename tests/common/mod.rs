//! Shared test harness: an in-memory [`IdentityProvider`] double plus
//! profile/token fixtures, so the store suites run without any network.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use oqim_link::{
    AuthChange, IdentityProvider, Language, NewProfile, OqimLinkError, Profile, ProfileUpdate,
    Result, Session, SessionStatus, SessionToken, SignUpMetadata, SubscriptionTier,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};

/// How long a test waits for the store's background listener to publish.
pub const PUBLISH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);

/// In-memory identity provider double.
///
/// Accounts and profile rows live in hash maps; failure toggles let each test
/// break exactly one provider operation. Change notifications are emitted
/// manually via [`FakeIdentityProvider::emit`] — nothing fires implicitly, so
/// tests stay deterministic.
pub struct FakeIdentityProvider {
    /// email -> (password, user id)
    accounts: Mutex<HashMap<String, (String, String)>>,
    /// user id -> profile row
    profiles: Mutex<HashMap<String, Profile>>,
    stored_session: Mutex<Option<SessionToken>>,
    change_tx: broadcast::Sender<AuthChange>,
    next_user_id: AtomicUsize,

    pub fail_current_session: AtomicBool,
    pub fail_insert_profile: AtomicBool,
    pub fail_update_profile: AtomicBool,
    pub fail_sign_out: AtomicBool,
    /// Simulate a backend that creates the profile row itself on sign-up
    /// (e.g. via database trigger).
    pub auto_profile_on_signup: AtomicBool,

    pub sign_out_calls: AtomicUsize,
    pub update_profile_calls: AtomicUsize,
}

impl FakeIdentityProvider {
    pub fn new() -> Arc<Self> {
        let (change_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
            stored_session: Mutex::new(None),
            change_tx,
            next_user_id: AtomicUsize::new(100),
            fail_current_session: AtomicBool::new(false),
            fail_insert_profile: AtomicBool::new(false),
            fail_update_profile: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            auto_profile_on_signup: AtomicBool::new(false),
            sign_out_calls: AtomicUsize::new(0),
            update_profile_calls: AtomicUsize::new(0),
        })
    }

    /// Register an account with its profile row.
    pub fn add_user(&self, email: &str, password: &str, profile: Profile) {
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), (password.to_string(), profile.id.clone()));
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    /// Seed a persisted session, as if a previous run had signed in.
    pub fn set_stored_session(&self, token: SessionToken) {
        *self.stored_session.lock().unwrap() = Some(token);
    }

    /// Replace a stored profile row (e.g. "billing extended the subscription").
    pub fn put_profile(&self, profile: Profile) {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.id.clone(), profile);
    }

    pub fn profile_of(&self, user_id: &str) -> Option<Profile> {
        self.profiles.lock().unwrap().get(user_id).cloned()
    }

    /// Push a session-change notification to every subscriber.
    pub fn emit(&self, change: AuthChange) {
        let _ = self.change_tx.send(change);
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn current_session(&self) -> Result<Option<SessionToken>> {
        if self.fail_current_session.load(Ordering::SeqCst) {
            return Err(OqimLinkError::NetworkError("dns failure".into()));
        }
        Ok(self.stored_session.lock().unwrap().clone())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.change_tx.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionToken> {
        let accounts = self.accounts.lock().unwrap();
        match accounts.get(email) {
            Some((stored_password, user_id)) if stored_password == password => {
                Ok(make_token(user_id))
            },
            _ => Err(OqimLinkError::AuthenticationError(
                "Invalid login credentials".into(),
            )),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SessionToken> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(OqimLinkError::AuthenticationError(
                "User already registered".into(),
            ));
        }

        let user_id = format!("usr-{}", self.next_user_id.fetch_add(1, Ordering::SeqCst));
        accounts.insert(email.to_string(), (password.to_string(), user_id.clone()));

        if self.auto_profile_on_signup.load(Ordering::SeqCst) {
            let mut profile = base_profile(&user_id, email);
            profile.display_name = metadata.display_name;
            self.profiles
                .lock()
                .unwrap()
                .insert(user_id.clone(), profile);
        }

        Ok(make_token(&user_id))
    }

    async fn sign_out(&self) -> Result<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        *self.stored_session.lock().unwrap() = None;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(OqimLinkError::NetworkError("connection reset".into()));
        }
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.profiles.lock().unwrap().get(user_id).cloned())
    }

    async fn insert_profile(&self, row: &NewProfile) -> Result<()> {
        if self.fail_insert_profile.load(Ordering::SeqCst) {
            return Err(OqimLinkError::ServerError {
                status_code: 403,
                message: "new row violates row-level security policy".into(),
            });
        }

        let now = Utc::now();
        let profile = Profile {
            id: row.id.clone(),
            email: row.email.clone(),
            display_name: row.display_name.clone(),
            avatar_url: None,
            wallet_balance: row.wallet_balance,
            subscription_tier: SubscriptionTier::None,
            subscription_expires_at: None,
            admin_access: row.admin_access,
            admin_access_until: None,
            preferred_language: row.preferred_language,
            is_admin: row.is_admin,
            created_at: now,
            updated_at: now,
        };
        self.profiles
            .lock()
            .unwrap()
            .insert(row.id.clone(), profile);
        Ok(())
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()> {
        self.update_profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_update_profile.load(Ordering::SeqCst) {
            return Err(OqimLinkError::ServerError {
                status_code: 500,
                message: "internal error".into(),
            });
        }

        let mut profiles = self.profiles.lock().unwrap();
        match profiles.get_mut(user_id) {
            Some(profile) => {
                update.apply_to(profile);
                Ok(())
            },
            None => Err(OqimLinkError::ServerError {
                status_code: 404,
                message: "no such profile".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------

/// A session token valid for another hour.
pub fn make_token(user_id: &str) -> SessionToken {
    SessionToken {
        user_id: user_id.to_string(),
        access_token: format!("access-{}", user_id),
        refresh_token: Some(format!("refresh-{}", user_id)),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

/// Profile with no entitlements at all.
pub fn base_profile(user_id: &str, email: &str) -> Profile {
    let now = Utc::now();
    Profile {
        id: user_id.to_string(),
        email: email.to_string(),
        display_name: None,
        avatar_url: None,
        wallet_balance: 0,
        subscription_tier: SubscriptionTier::None,
        subscription_expires_at: None,
        admin_access: false,
        admin_access_until: None,
        preferred_language: Language::Ru,
        is_admin: false,
        created_at: now,
        updated_at: now,
    }
}

/// Profile with a premium subscription running to the year 2999.
pub fn premium_profile(user_id: &str, email: &str) -> Profile {
    let mut profile = base_profile(user_id, email);
    profile.subscription_tier = SubscriptionTier::Premium;
    profile.subscription_expires_at = Some(Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap());
    profile
}

/// Profile whose only entitlement is an admin grant ending at `until`
/// (`None` = unbounded).
pub fn admin_profile(user_id: &str, email: &str, until: Option<DateTime<Utc>>) -> Profile {
    let mut profile = base_profile(user_id, email);
    profile.admin_access = true;
    profile.admin_access_until = until;
    profile
}

/// Wait until the published session reaches `status`, or panic after
/// [`PUBLISH_TIMEOUT`].
pub async fn wait_for_status(
    sessions: &mut watch::Receiver<Session>,
    status: SessionStatus,
) -> Session {
    let result = tokio::time::timeout(
        PUBLISH_TIMEOUT,
        sessions.wait_for(|session| session.status() == status),
    )
    .await;
    match result {
        Ok(Ok(session)) => session.clone(),
        Ok(Err(_)) => panic!("session channel closed while waiting for {:?}", status),
        Err(_) => panic!("session never reached {:?}", status),
    }
}
