use serde::Serialize;

/// Request body for the refresh-token grant.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshGrant {
    pub refresh_token: String,
}
