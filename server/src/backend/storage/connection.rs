use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

// The database URL used when nothing is configured
pub const DEFAULT_DATABASE_URL: &str = "sqlite:attendance.db";

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DEFAULT_DATABASE_URL).await
    }

    /// Initialize a throwaway in-memory database with a unique name.
    /// Used by unit and integration tests.
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap liveness probe
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(self.pool()).await?;
        Ok(())
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('OPERATIVE', 'ADMIN', 'ROOT')),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                session_token TEXT,
                last_seen_at TEXT
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS barrios (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                name_key TEXT NOT NULL UNIQUE,
                is_active BOOLEAN NOT NULL DEFAULT TRUE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS youth (
                cedula TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                full_name_key TEXT NOT NULL,
                phone TEXT NOT NULL,
                barrio_id INTEGER NOT NULL,
                birth_date TEXT,
                FOREIGN KEY (barrio_id) REFERENCES barrios (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Create index for ordering youth by name
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_youth_full_name
            ON youth(full_name);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                service_date TEXT NOT NULL,
                starts_at TEXT NOT NULL,
                ends_at TEXT,
                is_active BOOLEAN NOT NULL DEFAULT FALSE,
                created_by INTEGER NOT NULL,
                FOREIGN KEY (created_by) REFERENCES users (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // Streak computation and the admin listing both walk services newest first
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_services_starts_at
            ON services(starts_at DESC);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS attendance (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                service_id INTEGER NOT NULL,
                youth_cedula TEXT NOT NULL,
                registered_by INTEGER NOT NULL,
                registered_at TEXT NOT NULL,
                FOREIGN KEY (service_id) REFERENCES services (id),
                FOREIGN KEY (youth_cedula) REFERENCES youth (cedula),
                FOREIGN KEY (registered_by) REFERENCES users (id),
                CONSTRAINT uq_service_youth UNIQUE (service_id, youth_cedula)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_attendance_youth_cedula
            ON attendance(youth_cedula);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
