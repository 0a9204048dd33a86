use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::backend::domain::models::service::{NewService, Service, SERVICE_TIMESTAMP_FORMAT};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::{parse_date, ServiceStorage};

/// Repository for service operations
#[derive(Clone)]
pub struct ServiceRepository {
    db: DbConnection,
}

const SERVICE_COLUMNS: &str = "id, title, service_date, starts_at, ends_at, is_active, created_by";

fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(SERVICE_TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, SERVICE_TIMESTAMP_FORMAT)
        .map_err(|e| anyhow!("Invalid stored service timestamp '{}': {}", value, e))
}

impl ServiceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn row_to_service(row: &SqliteRow) -> Result<Service> {
        let service_date: String = row.try_get("service_date")?;
        let starts_at: String = row.try_get("starts_at")?;
        let ends_at: Option<String> = row.try_get("ends_at")?;

        Ok(Service {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            service_date: parse_date(&service_date)?,
            starts_at: parse_timestamp(&starts_at)?,
            ends_at: ends_at.as_deref().map(parse_timestamp).transpose()?,
            is_active: row.try_get("is_active")?,
            created_by: row.try_get("created_by")?,
        })
    }
}

#[async_trait]
impl ServiceStorage for ServiceRepository {
    async fn create_service(&self, service: &NewService) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO services (title, service_date, starts_at, ends_at, is_active, created_by)
            VALUES (?, ?, ?, NULL, FALSE, ?)
            "#,
        )
        .bind(&service.title)
        .bind(service.service_date.format("%Y-%m-%d").to_string())
        .bind(format_timestamp(service.starts_at))
        .bind(service.created_by)
        .execute(self.db.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_service(&self, service_id: i64) -> Result<Option<Service>> {
        let row = sqlx::query(&format!("SELECT {} FROM services WHERE id = ?", SERVICE_COLUMNS))
            .bind(service_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::row_to_service).transpose()
    }

    async fn set_active(&self, service_id: i64, is_active: bool, ends_at: Option<NaiveDateTime>) -> Result<()> {
        sqlx::query("UPDATE services SET is_active = ?, ends_at = ? WHERE id = ?")
            .bind(is_active)
            .bind(ends_at.map(format_timestamp))
            .bind(service_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn list_recent_services(&self, limit: u32) -> Result<Vec<Service>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM services ORDER BY starts_at DESC, id DESC LIMIT ?",
            SERVICE_COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_service).collect()
    }

    async fn list_active_services(&self) -> Result<Vec<Service>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM services WHERE is_active = TRUE ORDER BY starts_at DESC, id DESC",
            SERVICE_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_service).collect()
    }

    async fn list_eligible_services(&self, before: NaiveDateTime, max_count: usize) -> Result<Vec<Service>> {
        if max_count == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {} FROM services WHERE starts_at <= ? ORDER BY starts_at DESC, id DESC LIMIT ?",
            SERVICE_COLUMNS
        ))
        .bind(format_timestamp(before))
        .bind(max_count as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::row_to_service).collect()
    }
}
