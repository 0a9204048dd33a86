//! Shared fixtures for domain service tests.
use std::sync::Arc;

use shared::Role;

use crate::backend::domain::models::user::{NewUser, Principal};
use crate::backend::storage::{
    AttendanceRepository, BarrioRepository, BarrioStorage, DbConnection, ServiceRepository,
    UserRepository, UserStorage, YouthRepository,
};

/// Every repository, backed by one fresh in-memory database
pub struct TestStores {
    pub db: DbConnection,
    pub users: Arc<UserRepository>,
    pub barrios: Arc<BarrioRepository>,
    pub youth: Arc<YouthRepository>,
    pub services: Arc<ServiceRepository>,
    pub attendance: Arc<AttendanceRepository>,
}

pub async fn setup_stores() -> TestStores {
    let db = DbConnection::init_test().await.expect("Failed to create test database");
    TestStores {
        users: Arc::new(UserRepository::new(db.clone())),
        barrios: Arc::new(BarrioRepository::new(db.clone())),
        youth: Arc::new(YouthRepository::new(db.clone())),
        services: Arc::new(ServiceRepository::new(db.clone())),
        attendance: Arc::new(AttendanceRepository::new(db.clone())),
        db,
    }
}

impl TestStores {
    /// Insert an active account whose password hash is a placeholder
    pub async fn seed_principal(&self, username: &str, role: Role) -> Principal {
        let id = self
            .users
            .create_user(&NewUser {
                username: username.to_string(),
                password_hash: "unused".to_string(),
                role,
                is_active: true,
            })
            .await
            .expect("Failed to seed user");
        Principal {
            id,
            username: username.to_string(),
            role,
        }
    }

    pub async fn seed_barrio(&self, name: &str) -> i64 {
        self.barrios.create_barrio(name).await.expect("Failed to seed barrio")
    }
}
