//! Login, logout and the stored half of session state.
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::domain::commands::auth::{LoginCommand, LoginResult};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::user::{Principal, User};
use crate::backend::domain::password::{generate_token, verify_password};
use crate::backend::storage::UserStorage;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStorage>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStorage>) -> Self {
        Self { users }
    }

    /// Verify credentials of an active account and rotate its session token.
    /// Any previously issued token stops being valid.
    pub async fn login(&self, command: LoginCommand) -> DomainResult<LoginResult> {
        let username = command.username.trim();

        let user = match self.users.find_by_username(username).await? {
            Some(user) if user.is_active && verify_password(&command.password, &user.password_hash) => user,
            _ => {
                warn!("Rejected login for username '{}'", username);
                return Err(DomainError::InvalidCredentials);
            }
        };

        let token = generate_token();
        self.users.update_principal_session(user.id, Some(&token)).await?;
        self.users.touch_last_seen(user.id, Utc::now()).await?;

        info!("User {} ({}) logged in", user.username, user.role);

        Ok(LoginResult {
            principal: Principal::from(&user),
            token,
        })
    }

    /// Invalidate every session of the principal
    pub async fn logout(&self, principal: &Principal) -> DomainResult<()> {
        self.users.update_principal_session(principal.id, None).await?;
        info!("User {} logged out", principal.username);
        Ok(())
    }

    /// The token currently accepted for `principal_id`, if any
    pub async fn stored_token(&self, principal_id: i64) -> DomainResult<Option<String>> {
        let session = self.users.read_principal_session(principal_id).await?;
        Ok(session.and_then(|s| s.token))
    }

    pub async fn load_user(&self, principal_id: i64) -> DomainResult<Option<User>> {
        Ok(self.users.get_user(principal_id).await?)
    }

    pub async fn record_activity(&self, principal_id: i64, at: DateTime<Utc>) -> DomainResult<()> {
        self.users.touch_last_seen(principal_id, at).await?;
        Ok(())
    }
}
