use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::collections::{HashMap, HashSet};

use crate::backend::domain::models::attendance::{
    AttendanceMark, AttendanceRecord, RegisterOutcome, RegistrationOrder,
};
use crate::backend::storage::connection::DbConnection;
use crate::backend::storage::repositories::youth_repository::YouthRepository;
use crate::backend::storage::traits::{parse_utc, AttendanceStorage};

/// Repository for attendance marks
#[derive(Clone)]
pub struct AttendanceRepository {
    db: DbConnection,
}

impl AttendanceRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }
}

fn push_cedula_list(builder: &mut QueryBuilder<'_, Sqlite>, cedulas: &[String]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for cedula in cedulas {
        separated.push_bind(cedula.clone());
    }
    separated.push_unseparated(")");
}

fn push_id_list(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    builder.push("(");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

#[async_trait]
impl AttendanceStorage for AttendanceRepository {
    async fn register_attendance(
        &self,
        service_id: i64,
        cedula: &str,
        registered_by: i64,
        registered_at: DateTime<Utc>,
    ) -> Result<RegisterOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (service_id, youth_cedula, registered_by, registered_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(service_id)
        .bind(cedula)
        .bind(registered_by)
        .bind(registered_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(self.db.pool())
        .await;

        match result {
            Ok(done) => Ok(RegisterOutcome::Registered(AttendanceMark {
                id: done.last_insert_rowid(),
                service_id,
                youth_cedula: cedula.to_string(),
                registered_by,
                registered_at,
            })),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Ok(RegisterOutcome::AlreadyRegistered)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_for_service(&self, service_id: i64, order: RegistrationOrder) -> Result<Vec<AttendanceRecord>> {
        let direction = match order {
            RegistrationOrder::OldestFirst => "ASC",
            RegistrationOrder::NewestFirst => "DESC",
        };

        let rows = sqlx::query(&format!(
            r#"
            SELECT a.id AS attendance_id, a.service_id, a.registered_by, a.registered_at,
                   y.cedula, y.full_name, y.phone, y.barrio_id, y.birth_date,
                   b.name AS barrio_name, u.username AS registered_by_username
            FROM attendance a
            JOIN youth y ON y.cedula = a.youth_cedula
            LEFT JOIN barrios b ON b.id = y.barrio_id
            LEFT JOIN users u ON u.id = a.registered_by
            WHERE a.service_id = ?
            ORDER BY a.registered_at {dir}, a.id {dir}
            "#,
            dir = direction
        ))
        .bind(service_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let youth = YouthRepository::row_to_youth(row)?;
                let registered_at: String = row.try_get("registered_at")?;
                Ok(AttendanceRecord {
                    mark: AttendanceMark {
                        id: row.try_get("attendance_id")?,
                        service_id: row.try_get("service_id")?,
                        youth_cedula: youth.cedula.clone(),
                        registered_by: row.try_get("registered_by")?,
                        registered_at: parse_utc(&registered_at)?,
                    },
                    youth,
                    barrio_name: row.try_get("barrio_name")?,
                    registered_by_username: row.try_get("registered_by_username")?,
                })
            })
            .collect()
    }

    async fn list_attendance_for(&self, cedulas: &[String], service_ids: &[i64]) -> Result<HashSet<(String, i64)>> {
        if cedulas.is_empty() || service_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT youth_cedula, service_id FROM attendance WHERE youth_cedula IN ");
        push_cedula_list(&mut builder, cedulas);
        builder.push(" AND service_id IN ");
        push_id_list(&mut builder, service_ids);

        let rows = builder.build().fetch_all(self.db.pool()).await?;

        rows.iter()
            .map(|row| {
                let cedula: String = row.try_get("youth_cedula")?;
                let service_id: i64 = row.try_get("service_id")?;
                Ok((cedula, service_id))
            })
            .collect()
    }

    async fn attendance_counts(&self, cedulas: &[String]) -> Result<HashMap<String, u32>> {
        if cedulas.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT youth_cedula, COUNT(DISTINCT service_id) AS total FROM attendance WHERE youth_cedula IN ",
        );
        push_cedula_list(&mut builder, cedulas);
        builder.push(" GROUP BY youth_cedula");

        let rows = builder.build().fetch_all(self.db.pool()).await?;

        rows.iter()
            .map(|row| {
                let cedula: String = row.try_get("youth_cedula")?;
                let total: i64 = row.try_get("total")?;
                Ok((cedula, total as u32))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn setup_test() -> AttendanceRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        for statement in [
            "INSERT INTO users (id, username, password_hash, role) VALUES (1, 'op', 'x', 'OPERATIVE')",
            "INSERT INTO barrios (id, name, name_key) VALUES (1, 'Alaska', 'alaska')",
            "INSERT INTO youth (cedula, full_name, full_name_key, phone, barrio_id) VALUES ('112340567', 'Maria Rojas', 'maria rojas', '88887777', 1)",
            "INSERT INTO youth (cedula, full_name, full_name_key, phone, barrio_id) VALUES ('298760001', 'Jose Mora', 'jose mora', '61112222', 1)",
            "INSERT INTO services (id, title, service_date, starts_at, created_by) VALUES (1, 'A', '2024-05-01', '2024-05-01T19:00:00', 1)",
            "INSERT INTO services (id, title, service_date, starts_at, created_by) VALUES (2, 'B', '2024-05-08', '2024-05-08T19:00:00', 1)",
        ] {
            sqlx::query(statement).execute(db.pool()).await.expect("Failed to seed");
        }
        AttendanceRepository::new(db)
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_reported() {
        let repo = setup_test().await;
        let now = Utc::now();

        let first = repo.register_attendance(1, "112340567", 1, now).await.unwrap();
        assert!(matches!(first, RegisterOutcome::Registered(ref m) if m.service_id == 1));

        let second = repo.register_attendance(1, "112340567", 1, now).await.unwrap();
        assert_eq!(second, RegisterOutcome::AlreadyRegistered);
    }

    #[tokio::test]
    async fn test_list_for_service_orders_by_registration() {
        let repo = setup_test().await;
        let now = Utc::now();
        repo.register_attendance(1, "112340567", 1, now).await.unwrap();
        repo.register_attendance(1, "298760001", 1, now + Duration::seconds(30)).await.unwrap();

        let oldest: Vec<String> = repo
            .list_for_service(1, RegistrationOrder::OldestFirst)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.youth.cedula)
            .collect();
        assert_eq!(oldest, vec!["112340567", "298760001"]);

        let newest = repo.list_for_service(1, RegistrationOrder::NewestFirst).await.unwrap();
        assert_eq!(newest[0].youth.cedula, "298760001");
        assert_eq!(newest[0].barrio_name.as_deref(), Some("Alaska"));
        assert_eq!(newest[0].registered_by_username.as_deref(), Some("op"));
    }

    #[tokio::test]
    async fn test_batch_lookups() {
        let repo = setup_test().await;
        let now = Utc::now();
        repo.register_attendance(1, "112340567", 1, now).await.unwrap();
        repo.register_attendance(2, "112340567", 1, now).await.unwrap();
        repo.register_attendance(2, "298760001", 1, now).await.unwrap();

        let cedulas = vec!["112340567".to_string(), "298760001".to_string()];
        let pairs = repo.list_attendance_for(&cedulas, &[2]).await.unwrap();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("298760001".to_string(), 2)));
        assert!(!pairs.contains(&("112340567".to_string(), 1)));

        let counts = repo.attendance_counts(&cedulas).await.unwrap();
        assert_eq!(counts.get("112340567"), Some(&2));
        assert_eq!(counts.get("298760001"), Some(&1));

        assert!(repo.list_attendance_for(&[], &[1, 2]).await.unwrap().is_empty());
        assert!(repo.attendance_counts(&[]).await.unwrap().is_empty());
    }
}
