use async_trait::async_trait;

use crate::error::Result;
use crate::models::{MessageRow, NewMessage, PageRequest};

/// Remote `messages` table with its `profiles` relation.
///
/// Implementations own persistence, joins and authorization; the board only
/// issues these four calls and never re-checks ownership itself.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Rows newest-first (`created_at` desc, then `id` desc), bounded by the
    /// page, each with its joined profile name.
    async fn list_messages(&self, page: &PageRequest) -> Result<Vec<MessageRow>>;

    /// Insert one row and return it as stored, including the server-assigned
    /// `id` and `created_at`.
    async fn insert_message(&self, message: &NewMessage) -> Result<MessageRow>;

    /// Delete the row with exactly this id. Deleting a missing id is not an
    /// error.
    async fn delete_message(&self, id: &str) -> Result<()>;

    /// Display name from the profile of `user_id`, if one exists.
    async fn profile_name(&self, user_id: &str) -> Result<Option<String>>;
}
