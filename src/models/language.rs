use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface language stored on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Russian (platform default).
    #[default]
    Ru,
    /// Uzbek.
    Uz,
}

impl Language {
    /// Wire representation ("ru" / "uz").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::Uz => "uz",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
