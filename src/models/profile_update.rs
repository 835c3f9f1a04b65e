use serde::Serialize;

use super::language::Language;
use super::profile::Profile;

/// Partial profile update: only the fields that are set are sent to the
/// backend, and only those fields are merged into the in-memory profile on
/// success.
///
/// Entitlement fields are deliberately absent — they belong to the billing
/// integration and the back-office, not to the account owner.
///
/// # Examples
///
/// ```rust
/// use oqim_link::{Language, ProfileUpdate};
///
/// let update = ProfileUpdate::new()
///     .display_name("Aziza")
///     .preferred_language(Language::Uz);
/// assert!(!update.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<Language>,
}

impl ProfileUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the display name.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the avatar URL.
    pub fn avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// Set the preferred interface language.
    pub fn preferred_language(mut self, language: Language) -> Self {
        self.preferred_language = Some(language);
        self
    }

    /// `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.avatar_url.is_none()
            && self.preferred_language.is_none()
    }

    /// Merge the supplied fields into a profile, leaving the rest untouched.
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(name) = &self.display_name {
            profile.display_name = Some(name.clone());
        }
        if let Some(url) = &self.avatar_url {
            profile.avatar_url = Some(url.clone());
        }
        if let Some(language) = self.preferred_language {
            profile.preferred_language = language;
        }
    }
}
