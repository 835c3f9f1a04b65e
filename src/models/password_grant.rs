use serde::Serialize;

/// Request body for the password grant (email + password sign-in).
#[derive(Debug, Clone, Serialize)]
pub struct PasswordGrant {
    pub email: String,
    pub password: String,
}
