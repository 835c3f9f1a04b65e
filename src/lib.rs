//! # oqim-link: Oqim streaming platform client SDK
//!
//! Client library for the Oqim VOD/live-TV platform. Owns the process-wide
//! authentication session, mirrors it from the hosted identity/profile
//! backend, and answers the one question the player UI keeps asking: may the
//! current user watch paid content right now?
//!
//! ## Features
//!
//! - **Session lifecycle**: bootstrap from a persisted session, sign-in,
//!   sign-up (with default profile creation), sign-out
//! - **Change notifications**: the store follows provider-pushed session
//!   changes (sign-in from another client, token refresh, sign-out) for the
//!   lifetime of the process
//! - **Entitlement**: a pure predicate over subscription and admin-grant
//!   fields, admin grant evaluated first
//! - **Typed profiles**: the backend's profile rows as explicit records,
//!   validated at the provider boundary
//! - **Pluggable provider**: everything behind the [`IdentityProvider`]
//!   trait, so tests run against a fake without any network
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oqim_link::{AuthStore, ProfileUpdate, RestIdentityProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = RestIdentityProvider::builder()
//!         .base_url("https://project.oqim.tv")
//!         .api_key("public-anon-key")
//!         .build()?;
//!
//!     let store = Arc::new(AuthStore::new(Arc::new(provider)));
//!     store.initialize().await?;
//!
//!     if let Err(e) = store.login("viewer@example.com", "secret").await {
//!         eprintln!("Login rejected: {}", e);
//!     }
//!
//!     if store.can_watch() {
//!         // hand the stream URL to the player
//!     }
//!
//!     store
//!         .update_profile(ProfileUpdate::new().display_name("Aziza"))
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Following session changes
//!
//! ```rust,no_run
//! # async fn example(store: &oqim_link::AuthStore) {
//! let mut sessions = store.subscribe();
//! while sessions.changed().await.is_ok() {
//!     let session = sessions.borrow_and_update().clone();
//!     println!("session is now {:?}", session.status());
//! }
//! # }
//! ```

pub mod auth;
pub mod entitlement;
pub mod error;
pub mod models;
pub mod provider;
pub mod rest;
pub mod store;
pub mod token_store;

// Re-export main types for convenience
pub use auth::ApiAuth;
pub use error::{OqimLinkError, Result};
pub use models::{
    AuthChange, AuthUserInfo, Language, NewProfile, Profile, ProfileUpdate, Session, SessionStatus,
    SessionToken, SignUpMetadata, SubscriptionTier,
};
pub use provider::{ArcIdentityProvider, IdentityProvider};
pub use rest::RestIdentityProvider;
pub use store::AuthStore;
pub use token_store::{MemoryTokenStore, TokenStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
