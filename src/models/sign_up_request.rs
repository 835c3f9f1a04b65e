use serde::Serialize;

/// Optional account metadata attached to a sign-up request.
///
/// Stored by the identity backend alongside the credentials; the
/// application-owned profile row is inserted separately.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SignUpMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SignUpMetadata {
    /// Metadata carrying a display name.
    pub fn with_display_name(name: impl Into<String>) -> Self {
        Self {
            display_name: Some(name.into()),
        }
    }
}

/// Request body for account creation.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Backend convention: arbitrary user metadata travels under `data`.
    pub data: SignUpMetadata,
}
