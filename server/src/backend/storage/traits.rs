//! # Storage Traits
//!
//! This module defines the storage abstraction traits that the domain layer
//! depends on. The SQLite repositories in [`super::repositories`] implement
//! them; domain services only ever see `Arc<dyn ...Storage>`.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::{HashMap, HashSet};

use crate::backend::domain::models::attendance::{
    AttendanceRecord, RegisterOutcome, RegistrationOrder,
};
use crate::backend::domain::models::barrio::Barrio;
use crate::backend::domain::models::service::{NewService, Service};
use crate::backend::domain::models::user::{NewUser, PrincipalSession, User};
use crate::backend::domain::models::youth::{Youth, YouthSearch, YouthWithBarrio};

/// Trait defining the interface for user account storage
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a new account and return its id
    async fn create_user(&self, user: &NewUser) -> Result<i64>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All accounts, unordered
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Overwrite role, password and active flag in one statement
    async fn update_credentials(&self, user_id: i64, user: &NewUser) -> Result<()>;

    async fn set_active(&self, user_id: i64, is_active: bool) -> Result<()>;

    async fn set_password_hash(&self, user_id: i64, password_hash: &str) -> Result<()>;

    /// Replace the stored session token. `None` invalidates every session.
    /// This is a single UPDATE, so concurrent logins leave exactly one token.
    async fn update_principal_session(&self, user_id: i64, new_token: Option<&str>) -> Result<()>;

    /// Read the stored token and last-seen timestamp of a principal
    async fn read_principal_session(&self, user_id: i64) -> Result<Option<PrincipalSession>>;

    /// Record that the principal made an accepted request at `at`
    async fn touch_last_seen(&self, user_id: i64, at: DateTime<Utc>) -> Result<()>;

    /// Reassign everything the user registered or created to `heir_id`, then
    /// delete the user. Runs in a single transaction.
    async fn delete_user_reassigning(&self, user_id: i64, heir_id: i64) -> Result<()>;
}

/// Trait defining the interface for barrio storage
#[async_trait]
pub trait BarrioStorage: Send + Sync {
    async fn create_barrio(&self, name: &str) -> Result<i64>;

    async fn get_barrio(&self, barrio_id: i64) -> Result<Option<Barrio>>;

    /// Case-insensitive lookup by name, optionally ignoring one id
    async fn find_by_name(&self, name: &str, excluding: Option<i64>) -> Result<Option<Barrio>>;

    async fn rename_barrio(&self, barrio_id: i64, name: &str) -> Result<()>;

    async fn set_active(&self, barrio_id: i64, is_active: bool) -> Result<()>;

    /// Active barrios first, then by name
    async fn list_barrios(&self) -> Result<Vec<Barrio>>;

    /// Active barrios ordered by name
    async fn list_active_barrios(&self) -> Result<Vec<Barrio>>;
}

/// Trait defining the interface for youth storage
#[async_trait]
pub trait YouthStorage: Send + Sync {
    async fn store_youth(&self, youth: &Youth) -> Result<()>;

    async fn get_youth(&self, cedula: &str) -> Result<Option<Youth>>;

    async fn update_youth(&self, youth: &Youth) -> Result<()>;

    /// Delete the youth and all attendance marks for them, atomically.
    /// Returns false when no such youth existed.
    async fn delete_youth_with_attendance(&self, cedula: &str) -> Result<bool>;

    /// Matching youth ordered by name, at most `limit` rows
    async fn search_youth(&self, search: &YouthSearch, limit: u32) -> Result<Vec<YouthWithBarrio>>;

    /// Number of youth matching `search` (all youth for an empty search)
    async fn count_youth(&self, search: &YouthSearch) -> Result<u32>;
}

/// Trait defining the interface for service storage
#[async_trait]
pub trait ServiceStorage: Send + Sync {
    async fn create_service(&self, service: &NewService) -> Result<i64>;

    async fn get_service(&self, service_id: i64) -> Result<Option<Service>>;

    async fn set_active(&self, service_id: i64, is_active: bool, ends_at: Option<NaiveDateTime>) -> Result<()>;

    /// Newest `limit` services by start time
    async fn list_recent_services(&self, limit: u32) -> Result<Vec<Service>>;

    /// Active services, newest first
    async fn list_active_services(&self) -> Result<Vec<Service>>;

    /// Services with `starts_at <= before`, newest first, at most `max_count`
    async fn list_eligible_services(&self, before: NaiveDateTime, max_count: usize) -> Result<Vec<Service>>;
}

/// Trait defining the interface for attendance storage
#[async_trait]
pub trait AttendanceStorage: Send + Sync {
    /// Insert a mark; a duplicate (service, youth) pair is reported, not an error
    async fn register_attendance(
        &self,
        service_id: i64,
        cedula: &str,
        registered_by: i64,
        registered_at: DateTime<Utc>,
    ) -> Result<RegisterOutcome>;

    /// Marks for one service joined with youth, barrio and registering user
    async fn list_for_service(&self, service_id: i64, order: RegistrationOrder) -> Result<Vec<AttendanceRecord>>;

    /// Every (cedula, service_id) pair among the given ids, in one query
    async fn list_attendance_for(&self, cedulas: &[String], service_ids: &[i64]) -> Result<HashSet<(String, i64)>>;

    /// Distinct services attended per cédula
    async fn attendance_counts(&self, cedulas: &[String]) -> Result<HashMap<String, u32>>;
}

/// Lowercased form stored next to names for case-insensitive matching.
/// SQLite's own `lower()` and `NOCASE` only fold ASCII.
pub(crate) fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Parse a stored `YYYY-MM-DD` column
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid stored date '{}': {}", value, e))
}

/// Parse a stored RFC 3339 column
pub(crate) fn parse_utc(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow::anyhow!("Invalid stored timestamp '{}': {}", value, e))
}
