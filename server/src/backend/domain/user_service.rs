use std::sync::Arc;
use tracing::{info, warn};

use shared::Role;

use crate::backend::domain::authorization::Operation;
use crate::backend::domain::commands::users::CreateUserCommand;
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::user::{NewUser, Principal, User};
use crate::backend::domain::password::{generate_token, hash_password};
use crate::backend::storage::UserStorage;

/// Default username of the account that inherits records of deleted users
pub const DEFAULT_SYSTEM_USER: &str = "system";

/// Service for managing user accounts
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStorage>,
    system_username: String,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStorage>, system_username: impl Into<String>) -> Self {
        Self {
            users,
            system_username: system_username.into(),
        }
    }

    /// All accounts, ROOT first, then ADMIN, then OPERATIVE; by username within a role
    pub async fn list_users(&self, principal: &Principal) -> DomainResult<Vec<User>> {
        principal.authorize(Operation::ManageUsers)?;

        let mut users = self.users.list_users().await?;
        users.sort_by(|a, b| {
            a.role
                .rank()
                .cmp(&b.role.rank())
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(users)
    }

    pub async fn create_user(&self, principal: &Principal, command: CreateUserCommand) -> DomainResult<User> {
        principal.authorize(Operation::ManageUsers)?;

        let username = command.username.trim().to_string();
        if username.is_empty() || command.password.is_empty() {
            return Err(DomainError::validation("Username and password are required"));
        }
        let role: Role = command
            .role
            .parse()
            .map_err(|_| DomainError::validation("Invalid role"))?;

        if self.users.find_by_username(&username).await?.is_some() {
            warn!("Refusing to create duplicate user {}", username);
            return Err(DomainError::conflict("That username already exists"));
        }

        let id = self
            .users
            .create_user(&NewUser {
                username: username.clone(),
                password_hash: hash_password(&command.password)?,
                role,
                is_active: true,
            })
            .await?;

        info!("{} created user {} ({})", principal.username, username, role);
        self.require_user(id).await
    }

    /// Flip the active flag. Deactivating also ends the user's session.
    pub async fn toggle_user(&self, principal: &Principal, user_id: i64) -> DomainResult<User> {
        principal.authorize(Operation::ManageUsers)?;

        if user_id == principal.id {
            return Err(DomainError::validation("You cannot deactivate yourself"));
        }
        let user = self.require_user(user_id).await?;

        let now_active = !user.is_active;
        self.users.set_active(user_id, now_active).await?;
        if !now_active {
            self.users.update_principal_session(user_id, None).await?;
        }

        info!("{} set user {} active={}", principal.username, user.username, now_active);
        self.require_user(user_id).await
    }

    /// Set a new password and end every session of the user
    pub async fn reset_password(&self, principal: &Principal, user_id: i64, new_password: &str) -> DomainResult<User> {
        principal.authorize(Operation::ManageUsers)?;

        if new_password.is_empty() {
            return Err(DomainError::validation("Enter the new password"));
        }
        let user = self.require_user(user_id).await?;

        self.users.set_password_hash(user_id, &hash_password(new_password)?).await?;
        self.users.update_principal_session(user_id, None).await?;

        info!("{} reset the password of {}", principal.username, user.username);
        self.require_user(user_id).await
    }

    /// Delete a user, handing everything they registered or created to the
    /// system user. Neither the caller nor the system user can be deleted.
    pub async fn delete_user(&self, principal: &Principal, user_id: i64) -> DomainResult<()> {
        principal.authorize(Operation::ManageUsers)?;

        if user_id == principal.id {
            return Err(DomainError::validation("You cannot delete your own user"));
        }
        let user = self.require_user(user_id).await?;
        if user.username == self.system_username {
            return Err(DomainError::validation("The system user cannot be deleted"));
        }

        let heir = self.get_or_create_system_user().await?;
        self.users.delete_user_reassigning(user_id, heir.id).await?;

        info!(
            "{} deleted user {}; records reassigned to {}",
            principal.username, user.username, heir.username
        );
        Ok(())
    }

    /// The inactive ROOT account that inherits records of deleted users.
    /// Created with a random, never disclosed password on first use.
    pub async fn get_or_create_system_user(&self) -> DomainResult<User> {
        if let Some(user) = self.users.find_by_username(&self.system_username).await? {
            return Ok(user);
        }

        let id = self
            .users
            .create_user(&NewUser {
                username: self.system_username.clone(),
                password_hash: hash_password(&generate_token())?,
                role: Role::Root,
                is_active: false,
            })
            .await?;

        info!("Created system user {}", self.system_username);
        self.require_user(id).await
    }

    /// Create or overwrite a privileged account from the command line. The
    /// account ends up active with the given role and password and with no
    /// live session.
    pub async fn bootstrap_account(&self, username: &str, password: &str, role: Role) -> DomainResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("Username is required"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("Password is required"));
        }

        let account = NewUser {
            username: username.to_string(),
            password_hash: hash_password(password)?,
            role,
            is_active: true,
        };

        let id = match self.users.find_by_username(username).await? {
            Some(existing) => {
                self.users.update_credentials(existing.id, &account).await?;
                existing.id
            }
            None => self.users.create_user(&account).await?,
        };

        info!("Bootstrapped account {} ({})", username, role);
        self.require_user(id).await
    }

    async fn require_user(&self, user_id: i64) -> DomainResult<User> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User not found: {}", user_id)))
    }
}
