//! Domain model for attendance marks.
use chrono::{DateTime, Utc};

use super::youth::Youth;

/// A recorded (youth, service) pair
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceMark {
    pub id: i64,
    pub service_id: i64,
    pub youth_cedula: String,
    pub registered_by: i64,
    pub registered_at: DateTime<Utc>,
}

/// An attendance mark joined with the youth, their barrio and the registering user
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub mark: AttendanceMark,
    pub youth: Youth,
    pub barrio_name: Option<String>,
    pub registered_by_username: Option<String>,
}

/// Outcome of trying to insert a mark
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    Registered(AttendanceMark),
    AlreadyRegistered,
}

/// Sort direction for attendance listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOrder {
    OldestFirst,
    NewestFirst,
}
