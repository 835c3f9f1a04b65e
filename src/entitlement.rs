//! Playback entitlement.
//!
//! One pure predicate decides whether the current session may watch paid
//! content. Admin-granted access is evaluated strictly before subscription
//! status: an expired subscription with an active admin grant is entitled,
//! and an expired admin grant never revokes an active subscription. All
//! expiry comparisons are strict — a timestamp equal to "now" is already
//! expired.

use chrono::{DateTime, Utc};

use crate::models::{Profile, Session};

impl Profile {
    /// Whether this profile is entitled to watch paid content at `now`.
    ///
    /// Tolerates rows that violate the "expiry only with a tier" invariant:
    /// a tier with no expiry, or an expiry with no tier, both deny.
    pub fn entitled_at(&self, now: DateTime<Utc>) -> bool {
        if self.admin_access {
            return match self.admin_access_until {
                None => true,
                Some(until) => now < until,
            };
        }

        if !self.subscription_tier.is_none() {
            if let Some(expires_at) = self.subscription_expires_at {
                return now < expires_at;
            }
        }

        false
    }
}

impl Session {
    /// Whether the session may watch paid content at `now`.
    ///
    /// Pure: no I/O, no clock access. Anything short of an authenticated
    /// session denies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use oqim_link::Session;
    ///
    /// assert!(!Session::anonymous().can_watch_at(Utc::now()));
    /// ```
    pub fn can_watch_at(&self, now: DateTime<Utc>) -> bool {
        match self.profile() {
            Some(profile) => profile.entitled_at(now),
            None => false,
        }
    }
}
