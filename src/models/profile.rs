use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::language::Language;
use super::subscription_tier::SubscriptionTier;

/// One user account's profile row as stored in the backend.
///
/// `id` is assigned by the identity backend at account creation and never
/// changes. Entitlement fields (`subscription_*`, `admin_access*`) are
/// mutated by the billing integration and the back-office; this SDK only
/// reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable user id assigned by the identity backend.
    pub id: String,
    /// Unique, human-facing account identifier.
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Wallet balance in minor currency units, never negative.
    #[serde(default)]
    pub wallet_balance: u64,
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
    /// Meaningful only while a subscription tier is set.
    #[serde(default)]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    /// Admin-granted watch access, independent of any subscription.
    #[serde(default)]
    pub admin_access: bool,
    /// End of the admin grant; absent means unbounded.
    #[serde(default)]
    pub admin_access_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub preferred_language: Language,
    /// Back-office access flag, orthogonal to watch entitlement.
    #[serde(default)]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row inserted into the profile table right after account sign-up.
///
/// Carries the default entitlement fields a fresh account starts with: empty
/// wallet, no subscription, no admin access.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub wallet_balance: u64,
    pub admin_access: bool,
    pub preferred_language: Language,
    pub is_admin: bool,
}

impl NewProfile {
    /// Build the default profile row for a freshly created account.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: Option<String>,
        preferred_language: Language,
    ) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name,
            wallet_balance: 0,
            admin_access: false,
            preferred_language,
            is_admin: false,
        }
    }
}
