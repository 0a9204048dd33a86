use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::models::user::{NewUser, PrincipalSession, User};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::{parse_utc, UserStorage};

/// Repository for user account operations
#[derive(Clone)]
pub struct UserRepository {
    db: DbConnection,
}

impl UserRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_user(row: &SqliteRow) -> Result<User> {
        let role: String = row.try_get("role")?;
        let last_seen_at: Option<String> = row.try_get("last_seen_at")?;

        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role: role.parse().with_context(|| format!("Unknown role stored for user: {}", role))?,
            is_active: row.try_get("is_active")?,
            session_token: row.try_get("session_token")?,
            last_seen_at: last_seen_at.as_deref().map(parse_utc).transpose()?,
        })
    }
}

const USER_COLUMNS: &str =
    "id, username, password_hash, role, is_active, session_token, last_seen_at";

#[async_trait]
impl UserStorage for UserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role, is_active, session_token)
            VALUES (?, ?, ?, ?, NULL)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
            .bind(username)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {} FROM users", USER_COLUMNS))
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::row_to_user).collect()
    }

    async fn update_credentials(&self, user_id: i64, user: &NewUser) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET role = ?, password_hash = ?, is_active = ?, session_token = NULL
            WHERE id = ?
            "#,
        )
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user_id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn set_active(&self, user_id: i64, is_active: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn update_principal_session(&self, user_id: i64, new_token: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE users SET session_token = ? WHERE id = ?")
            .bind(new_token)
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn read_principal_session(&self, user_id: i64) -> Result<Option<PrincipalSession>> {
        let row = sqlx::query("SELECT session_token, last_seen_at FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await?;

        match row {
            Some(r) => {
                let last_seen_at: Option<String> = r.try_get("last_seen_at")?;
                Ok(Some(PrincipalSession {
                    token: r.try_get("session_token")?,
                    last_seen_at: last_seen_at.as_deref().map(parse_utc).transpose()?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn touch_last_seen(&self, user_id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE users SET last_seen_at = ? WHERE id = ?")
            .bind(at.to_rfc3339_opts(SecondsFormat::Micros, true))
            .bind(user_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn delete_user_reassigning(&self, user_id: i64, heir_id: i64) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("UPDATE attendance SET registered_by = ? WHERE registered_by = ?")
            .bind(heir_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE services SET created_by = ? WHERE created_by = ?")
            .bind(heir_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Role;

    async fn setup_test() -> UserRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        UserRepository::new(db)
    }

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            role,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = setup_test().await;

        let id = repo.create_user(&new_user("ana", Role::Admin)).await.expect("Failed to create user");

        let by_id = repo.get_user(id).await.expect("Query failed").expect("User missing");
        assert_eq!(by_id.username, "ana");
        assert_eq!(by_id.role, Role::Admin);
        assert!(by_id.is_active);
        assert_eq!(by_id.session_token, None);

        let by_name = repo.find_by_username("ana").await.expect("Query failed");
        assert_eq!(by_name.map(|u| u.id), Some(id));
        assert!(repo.find_by_username("ANA").await.expect("Query failed").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let repo = setup_test().await;
        repo.create_user(&new_user("ana", Role::Admin)).await.expect("Failed to create user");

        assert!(repo.create_user(&new_user("ana", Role::Operative)).await.is_err());
    }

    #[tokio::test]
    async fn test_principal_session_roundtrip() {
        let repo = setup_test().await;
        let id = repo.create_user(&new_user("op", Role::Operative)).await.unwrap();

        repo.update_principal_session(id, Some("tok-1")).await.unwrap();
        repo.update_principal_session(id, Some("tok-2")).await.unwrap();
        let now = Utc::now();
        repo.touch_last_seen(id, now).await.unwrap();

        let session = repo.read_principal_session(id).await.unwrap().expect("Session missing");
        assert_eq!(session.token.as_deref(), Some("tok-2"));
        assert_eq!(session.last_seen_at.map(|t| t.timestamp()), Some(now.timestamp()));

        repo.update_principal_session(id, None).await.unwrap();
        let cleared = repo.read_principal_session(id).await.unwrap().unwrap();
        assert_eq!(cleared.token, None);

        assert!(repo.read_principal_session(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_credentials_clears_token() {
        let repo = setup_test().await;
        let id = repo.create_user(&new_user("boss", Role::Admin)).await.unwrap();
        repo.update_principal_session(id, Some("live")).await.unwrap();
        repo.set_active(id, false).await.unwrap();

        let mut update = new_user("boss", Role::Root);
        update.password_hash = "new-hash".to_string();
        repo.update_credentials(id, &update).await.unwrap();

        let user = repo.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.role, Role::Root);
        assert_eq!(user.password_hash, "new-hash");
        assert!(user.is_active);
        assert_eq!(user.session_token, None);
    }

    #[tokio::test]
    async fn test_delete_user_reassigning_moves_services() {
        let repo = setup_test().await;
        let doomed = repo.create_user(&new_user("doomed", Role::Admin)).await.unwrap();
        let heir = repo.create_user(&new_user("system", Role::Root)).await.unwrap();

        sqlx::query(
            "INSERT INTO services (title, service_date, starts_at, is_active, created_by) VALUES ('s', '2024-01-01', '2024-01-01T19:00:00', 0, ?)",
        )
        .bind(doomed)
        .execute(repo.db.pool())
        .await
        .unwrap();

        repo.delete_user_reassigning(doomed, heir).await.expect("Delete failed");

        assert!(repo.get_user(doomed).await.unwrap().is_none());
        let owner: i64 = sqlx::query("SELECT created_by FROM services")
            .fetch_one(repo.db.pool())
            .await
            .unwrap()
            .get("created_by");
        assert_eq!(owner, heir);
    }
}
