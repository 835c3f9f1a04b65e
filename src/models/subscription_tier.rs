use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Paid subscription tier of a profile.
///
/// The backend stores `null` for "no subscription" and a lowercase string
/// otherwise, so serialization is hand-written rather than derived. Unknown
/// tier strings (e.g. a tier rolled out to the backend before this SDK learns
/// about it) deserialize to [`SubscriptionTier::None`] — an unknown tier can
/// never grant playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionTier {
    /// No active subscription.
    #[default]
    None,
    /// Entry tier.
    Basic,
    /// Mid tier.
    Standard,
    /// Top tier.
    Premium,
}

impl SubscriptionTier {
    /// Wire representation, `None` for the unsubscribed state.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Basic => Some("basic"),
            Self::Standard => Some("standard"),
            Self::Premium => Some("premium"),
        }
    }

    /// `true` when the profile has no subscription tier at all.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().unwrap_or("none"))
    }
}

impl Serialize for SubscriptionTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str() {
            Some(tier) => serializer.serialize_str(tier),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for SubscriptionTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("basic") => Self::Basic,
            Some("standard") => Self::Standard,
            Some("premium") => Self::Premium,
            Some(other) => {
                log::warn!(
                    "[PROFILE] Unknown subscription tier {:?}, treating as none",
                    other
                );
                Self::None
            },
            None => Self::None,
        })
    }
}
