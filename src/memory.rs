//! In-process message store.
//!
//! Keeps rows and profiles behind a `tokio` lock and answers the same
//! queries as the remote store, including keyset paging and the profile join.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{newest_first, JoinedProfile, MessageRow, NewMessage, PageRequest, ProfileRef};
use crate::store::MessageStore;

#[derive(Debug, Default)]
struct Tables {
    messages: Vec<StoredMessage>,
    profiles: HashMap<String, String>,
    next_id: u64,
}

#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    user_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl Tables {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn push(&mut self, user_id: &str, content: &str, created_at: DateTime<Utc>) -> MessageRow {
        let stored = StoredMessage {
            id: self.allocate_id(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            created_at,
        };
        let row = self.to_row(&stored, false);
        self.messages.push(stored);
        row
    }

    fn to_row(&self, stored: &StoredMessage, join: bool) -> MessageRow {
        let profiles = join.then(|| {
            JoinedProfile::One(ProfileRef {
                profile_name: self.profiles.get(&stored.user_id).cloned(),
            })
        });
        MessageRow {
            id: stored.id.clone(),
            user_id: stored.user_id.clone(),
            content: stored.content.clone(),
            created_at: stored.created_at,
            profiles,
        }
    }
}

/// A [`MessageStore`] held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile display name for `user_id`.
    #[must_use]
    pub fn with_profile(mut self, user_id: impl Into<String>, profile_name: impl Into<String>) -> Self {
        self.tables.get_mut().profiles.insert(user_id.into(), profile_name.into());
        self
    }

    /// Store a message with an explicit creation time.
    pub async fn seed(&self, user_id: &str, content: &str, created_at: DateTime<Utc>) -> MessageRow {
        self.tables.write().await.push(user_id, content, created_at)
    }

    /// Number of stored messages.
    pub async fn len(&self) -> usize {
        self.tables.read().await.messages.len()
    }

    /// Whether the store holds no messages.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn list_messages(&self, page: &PageRequest) -> Result<Vec<MessageRow>> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&StoredMessage> = tables
            .messages
            .iter()
            .filter(|m| page.admits(&m.created_at, &m.id))
            .collect();
        matching.sort_by(|a, b| newest_first((&a.created_at, a.id.as_str()), (&b.created_at, b.id.as_str())));

        Ok(matching
            .into_iter()
            .take(page.limit)
            .map(|m| tables.to_row(m, true))
            .collect())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<MessageRow> {
        let mut tables = self.tables.write().await;
        Ok(tables.push(&message.user_id, &message.content, Utc::now()))
    }

    async fn delete_message(&self, id: &str) -> Result<()> {
        self.tables.write().await.messages.retain(|m| m.id != id);
        Ok(())
    }

    async fn profile_name(&self, user_id: &str) -> Result<Option<String>> {
        Ok(self.tables.read().await.profiles.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn lists_newest_first_with_joined_profile() {
        let store = MemoryStore::new().with_profile("u1", "Alice");
        store.seed("u2", "yo", ts(1)).await;
        store.seed("u1", "hi", ts(2)).await;

        let rows = store.list_messages(&PageRequest::first(10)).await.unwrap();
        let contents: Vec<_> = rows.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, ["hi", "yo"]);
        assert_eq!(rows[0].joined_profile_name(), Some("Alice"));
        assert_eq!(rows[1].joined_profile_name(), None);
    }

    #[tokio::test]
    async fn limit_and_cursor_page_through_rows() {
        let store = MemoryStore::new();
        for day in 1..=5 {
            store.seed("u1", &format!("m{day}"), ts(day)).await;
        }

        let first = store.list_messages(&PageRequest::first(2)).await.unwrap();
        assert_eq!(first.iter().map(|r| r.content.as_str()).collect::<Vec<_>>(), ["m5", "m4"]);

        let cursor = crate::models::Cursor {
            created_at: first[1].created_at,
            id: first[1].id.clone(),
        };
        let second = store.list_messages(&PageRequest::before(2, cursor)).await.unwrap();
        assert_eq!(second.iter().map(|r| r.content.as_str()).collect::<Vec<_>>(), ["m3", "m2"]);
    }

    #[tokio::test]
    async fn insert_assigns_id_and_delete_is_idempotent() {
        let store = MemoryStore::new();
        let row = store
            .insert_message(&NewMessage {
                user_id: "u1".into(),
                content: "hello".into(),
            })
            .await
            .unwrap();
        assert!(!row.id.is_empty());
        assert_eq!(store.len().await, 1);

        store.delete_message(&row.id).await.unwrap();
        store.delete_message(&row.id).await.unwrap();
        assert!(store.is_empty().await);
    }
}
