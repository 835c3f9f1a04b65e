//! Session-token persistence abstraction.
//!
//! Lets the host application decide where the session token pair lives
//! between process runs (a file, the platform keychain, browser storage...).
//! The SDK ships an in-memory implementation; durable backends are the host's
//! concern.

use crate::error::Result;
use crate::models::SessionToken;
use tokio::sync::RwLock;

/// Storage backend for the persisted session token.
///
/// # Security Note
///
/// Implementations MUST protect the stored tokens: restrictive file
/// permissions (0600 on Unix), no logging of token material, encryption where
/// the platform offers it.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync + 'static {
    /// Read the persisted session token, if any.
    async fn get(&self) -> Result<Option<SessionToken>>;

    /// Persist a session token, replacing any previous one.
    async fn set(&self, token: &SessionToken) -> Result<()>;

    /// Remove the persisted session token.
    async fn clear(&self) -> Result<()>;
}

/// Process-local [`TokenStore`]: sessions do not survive a restart.
///
/// The default backend, also what the test suites use.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    inner: RwLock<Option<SessionToken>>,
}

impl MemoryTokenStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a token (restored-session scenarios).
    pub fn with_token(token: SessionToken) -> Self {
        Self {
            inner: RwLock::new(Some(token)),
        }
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> Result<Option<SessionToken>> {
        Ok(self.inner.read().await.clone())
    }

    async fn set(&self, token: &SessionToken) -> Result<()> {
        *self.inner.write().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn token() -> SessionToken {
        SessionToken {
            user_id: "usr-1".to_string(),
            access_token: "jwt".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.get().await.unwrap().is_none());

        store.set(&token()).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(token()));

        store.clear().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_preseeded() {
        let store = MemoryTokenStore::with_token(token());
        assert!(store.get().await.unwrap().is_some());
    }
}
