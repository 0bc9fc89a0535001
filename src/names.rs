//! Author display-name resolution.
//!
//! Every path that puts a name on a [`Message`](crate::models::Message) goes
//! through [`display_name`], so a rendered name is never empty.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{CurrentUser, MessageRow};
use crate::store::MessageStore;

/// Placeholder shown when no usable name is known.
pub const ANONYMOUS: &str = "Anonymous";

/// Resolve a candidate name, falling back to [`ANONYMOUS`] when it is absent
/// or blank.
#[must_use]
pub fn display_name(candidate: Option<&str>) -> String {
    match candidate {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => ANONYMOUS.to_string(),
    }
}

/// Name for a row read from the listing: its joined profile name.
#[must_use]
pub fn name_for_row(row: &MessageRow) -> String {
    display_name(row.joined_profile_name())
}

/// Where a freshly posted message gets its author name from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertNamePolicy {
    /// Use the poster's account email
    #[default]
    Email,
    /// Look up the poster's profile, as the listing does
    Profile,
}

impl InsertNamePolicy {
    /// Resolve the name for a message just posted by `user`.
    ///
    /// A failed profile lookup is logged and resolves to [`ANONYMOUS`]; the
    /// insert itself has already succeeded at this point.
    pub async fn resolve(self, store: &dyn MessageStore, user: &CurrentUser) -> String {
        match self {
            Self::Email => display_name(user.email.as_deref()),
            Self::Profile => match store.profile_name(&user.id).await {
                Ok(name) => display_name(name.as_deref()),
                Err(err) => {
                    warn!(user_id = %user.id, error = %err, "Profile lookup failed, using placeholder name");
                    display_name(None)
                },
            },
        }
    }
}

impl fmt::Display for InsertNamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Profile => f.write_str("profile"),
        }
    }
}

impl FromStr for InsertNamePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "profile" => Ok(Self::Profile),
            other => Err(anyhow!("Invalid insert name policy: {other}. Must be one of: email, profile")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_name_is_kept() {
        assert_eq!(display_name(Some("Alice")), "Alice");
    }

    #[test]
    fn missing_or_blank_name_is_anonymous() {
        assert_eq!(display_name(None), ANONYMOUS);
        assert_eq!(display_name(Some("")), ANONYMOUS);
        assert_eq!(display_name(Some("   ")), ANONYMOUS);
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!("EMAIL".parse::<InsertNamePolicy>().unwrap(), InsertNamePolicy::Email);
        assert_eq!("profile".parse::<InsertNamePolicy>().unwrap(), InsertNamePolicy::Profile);
        assert!("nickname".parse::<InsertNamePolicy>().is_err());
    }

    #[test]
    fn policy_round_trips_through_display() {
        for policy in [InsertNamePolicy::Email, InsertNamePolicy::Profile] {
            assert_eq!(policy.to_string().parse::<InsertNamePolicy>().unwrap(), policy);
        }
    }
}
