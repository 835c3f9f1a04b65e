use serde::{Deserialize, Serialize};

/// User record embedded in the backend's token responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserInfo {
    /// Stable user id.
    pub id: String,
    /// Account email, if the backend exposes it on this endpoint.
    #[serde(default)]
    pub email: Option<String>,
}
