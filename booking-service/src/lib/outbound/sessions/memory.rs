use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::user::models::UserId;
use crate::domain::user::ports::SessionStore;
use crate::user::errors::SessionStoreError;

struct Entry {
    user_id: UserId,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Token id store with per-entry expiry, kept in process memory.
///
/// Expired entries are dropped lazily on lookup and on every write.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<Uuid, Entry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save_token_meta(
        &self,
        token_uuid: Uuid,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or_else(|| {
            SessionStoreError::Unavailable(format!("TTL out of range: {:?}", ttl))
        })?;

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            token_uuid,
            Entry {
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn lookup_token_meta(&self, token_uuid: Uuid) -> Result<Option<UserId>, SessionStoreError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(&token_uuid) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.user_id)),
                None => return Ok(None),
                Some(_) => {}
            }
        }

        self.entries.write().await.remove(&token_uuid);
        Ok(None)
    }

    async fn delete_token_meta(&self, token_uuid: Uuid) -> Result<bool, SessionStoreError> {
        let now = Instant::now();
        Ok(self
            .entries
            .write()
            .await
            .remove(&token_uuid)
            .is_some_and(|entry| entry.is_live(now)))
    }
}
