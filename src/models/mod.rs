//! Data models for the oqim-link client.
//!
//! Typed records for the backend's auth and profile endpoints, plus the
//! process-wide session value published to consumers.

pub mod auth_change;
pub mod auth_user_info;
pub mod language;
pub mod password_grant;
pub mod profile;
pub mod profile_update;
pub mod refresh_grant;
pub mod session;
pub mod session_token;
pub mod sign_up_request;
pub mod subscription_tier;
pub mod token_response;


pub use auth_change::AuthChange;
pub use auth_user_info::AuthUserInfo;
pub use language::Language;
pub use password_grant::PasswordGrant;
pub use profile::{NewProfile, Profile};
pub use profile_update::ProfileUpdate;
pub use refresh_grant::RefreshGrant;
pub use session::{Session, SessionStatus};
pub use session_token::SessionToken;
pub use sign_up_request::{SignUpMetadata, SignUpRequest};
pub use subscription_tier::SubscriptionTier;
pub use token_response::TokenResponse;
