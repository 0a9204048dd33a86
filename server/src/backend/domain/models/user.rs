//! Domain model for user accounts and the authenticated principal.
use chrono::{DateTime, Utc};
use shared::Role;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    /// Token of the only live session, `None` when logged out everywhere
    pub session_token: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
}

/// Persisted half of a principal's session state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrincipalSession {
    pub token: Option<String>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// The account a request runs on behalf of. Passed explicitly into every
/// domain operation that needs to know who is acting.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}
