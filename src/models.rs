//! Data models for the message board
//!
//! This module holds the view-level [`Message`] entity together with the wire
//! rows exchanged with the message store and the paging cursor.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A message as shown on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned identifier
    pub id: String,
    /// Identifier of the authoring account
    pub user_id: String,
    /// Resolved display name of the author, never empty
    pub profile_name: String,
    /// Message text, exactly as posted
    pub content: String,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
    /// Reply thread. Never populated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Message>,
}

impl Message {
    /// Build a board message from a store row and an already-resolved name.
    #[must_use]
    pub fn from_row(row: MessageRow, profile_name: String) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            profile_name,
            content: row.content,
            created_at: row.created_at,
            replies: Vec::new(),
        }
    }

    /// Whether `user` wrote this message.
    #[must_use]
    pub fn is_authored_by(&self, user: &CurrentUser) -> bool {
        self.user_id == user.id
    }
}

/// A row of the `messages` table as returned by the store, with the joined
/// author profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRow {
    /// Server-assigned identifier (text or integer on the wire)
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// Identifier of the authoring account
    pub user_id: String,
    /// Message text
    pub content: String,
    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
    /// Joined author profile; absent on insert responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<JoinedProfile>,
}

impl MessageRow {
    /// Display name carried by the joined profile, if any.
    #[must_use]
    pub fn joined_profile_name(&self) -> Option<&str> {
        self.profiles.as_ref().and_then(JoinedProfile::profile_name)
    }

    /// Keyset position of this row in the store's newest-first order.
    #[must_use]
    pub fn cursor(&self) -> Cursor {
        Cursor {
            created_at: self.created_at,
            id: self.id.clone(),
        }
    }
}

/// The embedded `profiles` relation.
///
/// A to-one relation embeds as an object; a to-many relation embeds as an
/// array, of which the first entry is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JoinedProfile {
    /// Single embedded profile
    One(ProfileRef),
    /// Embedded profile list
    Many(Vec<ProfileRef>),
}

impl JoinedProfile {
    /// Display name of the embedded profile, if present.
    #[must_use]
    pub fn profile_name(&self) -> Option<&str> {
        match self {
            Self::One(profile) => profile.profile_name.as_deref(),
            Self::Many(profiles) => profiles.first().and_then(|p| p.profile_name.as_deref()),
        }
    }
}

/// The subset of a profile row the board reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRef {
    /// Display name chosen by the user
    #[serde(default)]
    pub profile_name: Option<String>,
}

/// Payload for inserting a new message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    /// Author account id
    pub user_id: String,
    /// Message text, untrimmed
    pub content: String,
}

/// The authenticated user, as provided by the auth context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account id
    pub id: String,
    /// Account email, when the auth provider exposes one
    #[serde(default)]
    pub email: Option<String>,
}

impl CurrentUser {
    /// Create a user with an email address.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: Some(email.into()),
        }
    }
}

/// Keyset cursor: the `(created_at, id)` of the oldest message already loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Creation time of the boundary row
    pub created_at: DateTime<Utc>,
    /// Id of the boundary row, used to break timestamp ties
    pub id: String,
}

/// One page of the newest-first message listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of rows to return
    pub limit: usize,
    /// Only return rows strictly older than this cursor
    pub before: Option<Cursor>,
}

impl PageRequest {
    /// The newest `limit` rows.
    #[must_use]
    pub const fn first(limit: usize) -> Self {
        Self { limit, before: None }
    }

    /// The `limit` rows that follow `cursor` in newest-first order.
    #[must_use]
    pub const fn before(limit: usize, cursor: Cursor) -> Self {
        Self {
            limit,
            before: Some(cursor),
        }
    }

    /// Whether a row sits strictly after the cursor in newest-first order.
    #[must_use]
    pub fn admits(&self, created_at: &DateTime<Utc>, id: &str) -> bool {
        self.before.as_ref().map_or(true, |cursor| {
            newest_first((created_at, id), (&cursor.created_at, cursor.id.as_str())) == Ordering::Greater
        })
    }
}

/// Newest-first ordering on `(created_at, id)`: newer rows compare `Less`.
///
/// Integer ids compare numerically, as a `bigint` key column does; any other
/// ids compare as text.
#[must_use]
pub fn newest_first(a: (&DateTime<Utc>, &str), b: (&DateTime<Utc>, &str)) -> Ordering {
    b.0.cmp(a.0).then_with(|| compare_ids(b.1, a.1))
}

fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Int(id) => id.to_string(),
    })
}
