//! Domain model for a scheduled service.
use chrono::{NaiveDate, NaiveDateTime};

/// Storage format for local service timestamps; sorts lexicographically
pub const SERVICE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub service_date: NaiveDate,
    /// Local wall-clock start time
    pub starts_at: NaiveDateTime,
    pub ends_at: Option<NaiveDateTime>,
    pub is_active: bool,
    pub created_by: i64,
}

#[derive(Debug, Clone)]
pub struct NewService {
    pub title: String,
    pub service_date: NaiveDate,
    pub starts_at: NaiveDateTime,
    pub created_by: i64,
}
