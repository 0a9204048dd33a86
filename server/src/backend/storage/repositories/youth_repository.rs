use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::backend::domain::models::youth::{Youth, YouthSearch, YouthWithBarrio};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::traits::{fold_case, parse_date, YouthStorage};

/// Repository for youth operations
#[derive(Clone)]
pub struct YouthRepository {
    db: DbConnection,
}

impl YouthRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    pub(crate) fn row_to_youth(row: &SqliteRow) -> Result<Youth> {
        let birth_date: Option<String> = row.try_get("birth_date")?;
        Ok(Youth {
            cedula: row.try_get("cedula")?,
            full_name: row.try_get("full_name")?,
            phone: row.try_get("phone")?,
            barrio_id: row.try_get("barrio_id")?,
            birth_date: birth_date.as_deref().map(parse_date).transpose()?,
        })
    }
}

/// Append the WHERE clause for a youth search. Names are matched on their
/// lowercased key.
fn push_search_filter(builder: &mut QueryBuilder<'_, Sqlite>, search: &YouthSearch) {
    let Some(text) = &search.text else {
        return;
    };

    builder.push(" WHERE (y.full_name_key LIKE ");
    builder.push_bind(format!("%{}%", fold_case(text)));
    if let Some(digits) = &search.digits {
        builder.push(" OR y.cedula LIKE ");
        builder.push_bind(format!("%{}%", digits));
        builder.push(" OR y.phone LIKE ");
        builder.push_bind(format!("%{}%", digits));
    }
    builder.push(")");
}

#[async_trait]
impl YouthStorage for YouthRepository {
    async fn store_youth(&self, youth: &Youth) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO youth (cedula, full_name, full_name_key, phone, barrio_id, birth_date)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&youth.cedula)
        .bind(&youth.full_name)
        .bind(fold_case(&youth.full_name))
        .bind(&youth.phone)
        .bind(youth.barrio_id)
        .bind(youth.birth_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn get_youth(&self, cedula: &str) -> Result<Option<Youth>> {
        let row = sqlx::query(
            r#"
            SELECT cedula, full_name, phone, barrio_id, birth_date
            FROM youth
            WHERE cedula = ?
            "#,
        )
        .bind(cedula)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::row_to_youth).transpose()
    }

    async fn update_youth(&self, youth: &Youth) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE youth
            SET full_name = ?, full_name_key = ?, phone = ?, barrio_id = ?, birth_date = ?
            WHERE cedula = ?
            "#,
        )
        .bind(&youth.full_name)
        .bind(fold_case(&youth.full_name))
        .bind(&youth.phone)
        .bind(youth.barrio_id)
        .bind(youth.birth_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(&youth.cedula)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_youth_with_attendance(&self, cedula: &str) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query("DELETE FROM attendance WHERE youth_cedula = ?")
            .bind(cedula)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM youth WHERE cedula = ?")
            .bind(cedula)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn search_youth(&self, search: &YouthSearch, limit: u32) -> Result<Vec<YouthWithBarrio>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT y.cedula, y.full_name, y.phone, y.barrio_id, y.birth_date, b.name AS barrio_name
            FROM youth y
            LEFT JOIN barrios b ON b.id = y.barrio_id
            "#,
        );
        push_search_filter(&mut builder, search);
        builder.push(" ORDER BY y.full_name ASC LIMIT ");
        builder.push_bind(limit as i64);

        let rows = builder.build().fetch_all(self.db.pool()).await?;

        rows.iter()
            .map(|row| {
                Ok(YouthWithBarrio {
                    youth: Self::row_to_youth(row)?,
                    barrio_name: row.try_get("barrio_name")?,
                })
            })
            .collect()
    }

    async fn count_youth(&self, search: &YouthSearch) -> Result<u32> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) AS total FROM youth y");
        push_search_filter(&mut builder, search);

        let row = builder.build().fetch_one(self.db.pool()).await?;
        let total: i64 = row.try_get("total")?;
        Ok(total as u32)
    }
}
