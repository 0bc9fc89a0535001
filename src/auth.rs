//! Auth context seam.
//!
//! Authentication itself is owned by the external service. The board only
//! asks who the current user is.

use crate::models::CurrentUser;

/// Source of the currently authenticated user
pub trait AuthContext: Send + Sync {
    /// The signed-in user, or `None` for a read-only visitor.
    fn current_user(&self) -> Option<CurrentUser>;
}

/// A fixed session: an optional user plus the access token issued for it
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<CurrentUser>,
    access_token: Option<String>,
}

impl StaticAuth {
    /// A visitor with no session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A signed-in session.
    #[must_use]
    pub fn signed_in(user: CurrentUser, access_token: Option<String>) -> Self {
        Self {
            user: Some(user),
            access_token,
        }
    }

    /// Bearer token for store requests made on behalf of this session.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl AuthContext for StaticAuth {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.clone()
    }
}
