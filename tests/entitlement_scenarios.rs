//! End-to-end entitlement scenarios: the predicate evaluated through the
//! store against real session transitions.

mod common;

use chrono::{Duration, TimeZone, Utc};
use common::*;
use oqim_link::AuthStore;
use std::sync::Arc;

async fn signed_in_store(
    provider: &Arc<FakeIdentityProvider>,
    profile: oqim_link::Profile,
) -> AuthStore {
    provider.add_user(&profile.email, "secret", profile.clone());
    let store = AuthStore::new(provider.clone());
    store.initialize().await.unwrap();
    store.login(&profile.email, "secret").await.unwrap();
    store
}

#[tokio::test]
async fn test_anonymous_visitor_cannot_watch() {
    let provider = FakeIdentityProvider::new();
    let store = AuthStore::new(provider.clone());
    store.initialize().await.unwrap();

    assert!(!store.can_watch());
}

#[tokio::test]
async fn test_active_premium_subscriber_can_watch() {
    let provider = FakeIdentityProvider::new();
    let store = signed_in_store(&provider, premium_profile("usr-1", "premium@example.com")).await;

    assert!(store.can_watch());
}

#[tokio::test]
async fn test_subscriber_with_elapsed_expiry_cannot_watch() {
    let provider = FakeIdentityProvider::new();
    let mut profile = premium_profile("usr-1", "lapsed@example.com");
    profile.subscription_expires_at = Some(Utc::now() - Duration::days(3));
    let store = signed_in_store(&provider, profile).await;

    assert!(!store.can_watch());
}

#[tokio::test]
async fn test_unbounded_admin_grant_can_watch() {
    let provider = FakeIdentityProvider::new();
    let store =
        signed_in_store(&provider, admin_profile("usr-1", "admin@example.com", None)).await;

    assert!(store.can_watch());
}

#[tokio::test]
async fn test_admin_grant_expired_in_2020_cannot_watch() {
    let provider = FakeIdentityProvider::new();
    let until = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let store =
        signed_in_store(&provider, admin_profile("usr-1", "admin@example.com", Some(until))).await;

    assert!(!store.can_watch());
}

#[tokio::test]
async fn test_admin_grant_outlives_expired_subscription() {
    let provider = FakeIdentityProvider::new();
    let mut profile = admin_profile("usr-1", "both@example.com", None);
    profile.subscription_tier = oqim_link::SubscriptionTier::Basic;
    profile.subscription_expires_at = Some(Utc::now() - Duration::days(30));
    let store = signed_in_store(&provider, profile).await;

    assert!(store.can_watch(), "admin grant is evaluated before subscription");
}

#[tokio::test]
async fn test_logout_revokes_entitlement() {
    let provider = FakeIdentityProvider::new();
    let store = signed_in_store(&provider, premium_profile("usr-1", "premium@example.com")).await;
    assert!(store.can_watch());

    store.logout().await;

    assert!(!store.can_watch());
}
