use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::models::barrio::Barrio;
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::{fold_case, BarrioStorage};

/// Repository for barrio operations
#[derive(Clone)]
pub struct BarrioRepository {
    db: DbConnection,
}

impl BarrioRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_barrio(row: &SqliteRow) -> Result<Barrio> {
        Ok(Barrio {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            is_active: row.try_get("is_active")?,
        })
    }
}

#[async_trait]
impl BarrioStorage for BarrioRepository {
    async fn create_barrio(&self, name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO barrios (name, name_key, is_active) VALUES (?, ?, TRUE)")
            .bind(name)
            .bind(fold_case(name))
            .execute(self.db.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    async fn get_barrio(&self, barrio_id: i64) -> Result<Option<Barrio>> {
        let row = sqlx::query("SELECT id, name, is_active FROM barrios WHERE id = ?")
            .bind(barrio_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_barrio).transpose()
    }

    async fn find_by_name(&self, name: &str, excluding: Option<i64>) -> Result<Option<Barrio>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, is_active
            FROM barrios
            WHERE name_key = ? AND (? IS NULL OR id != ?)
            LIMIT 1
            "#,
        )
        .bind(fold_case(name))
        .bind(excluding)
        .bind(excluding)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_barrio).transpose()
    }

    async fn rename_barrio(&self, barrio_id: i64, name: &str) -> Result<()> {
        sqlx::query("UPDATE barrios SET name = ?, name_key = ? WHERE id = ?")
            .bind(name)
            .bind(fold_case(name))
            .bind(barrio_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn set_active(&self, barrio_id: i64, is_active: bool) -> Result<()> {
        sqlx::query("UPDATE barrios SET is_active = ? WHERE id = ?")
            .bind(is_active)
            .bind(barrio_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn list_barrios(&self) -> Result<Vec<Barrio>> {
        let rows = sqlx::query(
            "SELECT id, name, is_active FROM barrios ORDER BY is_active DESC, name ASC",
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_barrio).collect()
    }

    async fn list_active_barrios(&self) -> Result<Vec<Barrio>> {
        let rows = sqlx::query(
            "SELECT id, name, is_active FROM barrios WHERE is_active = TRUE ORDER BY name ASC",
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_barrio).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> BarrioRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        BarrioRepository::new(db)
    }

    #[tokio::test]
    async fn test_find_by_name_is_case_insensitive() {
        let repo = setup_test().await;
        let id = repo.create_barrio("San Roque").await.expect("Failed to create barrio");

        let found = repo.find_by_name("san roque", None).await.unwrap();
        assert_eq!(found.map(|b| b.id), Some(id));

        // Excluding the barrio itself lets a rename keep its own name
        assert!(repo.find_by_name("SAN ROQUE", Some(id)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_name_folds_accented_letters() {
        let repo = setup_test().await;
        let id = repo.create_barrio("Ángeles").await.unwrap();

        let found = repo.find_by_name("ángeles", None).await.unwrap();
        assert_eq!(found.map(|b| b.id), Some(id));

        // The unique key rejects a case variant even if the lookup is skipped
        assert!(repo.create_barrio("ÁNGELES").await.is_err());

        repo.rename_barrio(id, "Ñorí").await.unwrap();
        assert!(repo.find_by_name("ñorí", None).await.unwrap().is_some());
        assert!(repo.find_by_name("ángeles", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_active_first() {
        let repo = setup_test().await;
        let victoria = repo.create_barrio("Victoria").await.unwrap();
        repo.create_barrio("Alaska").await.unwrap();
        let cerros = repo.create_barrio("Cerros").await.unwrap();
        repo.set_active(cerros, false).await.unwrap();

        let names: Vec<String> = repo.list_barrios().await.unwrap().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Alaska", "Victoria", "Cerros"]);

        let active: Vec<i64> = repo.list_active_barrios().await.unwrap().into_iter().map(|b| b.id).collect();
        assert_eq!(active.len(), 2);
        assert!(active.contains(&victoria));
    }
}
