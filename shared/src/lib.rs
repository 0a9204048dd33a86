use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod format;

/// Role granted to a user account.
///
/// Serialized in upper case ("OPERATIVE", "ADMIN", "ROOT") to match the
/// values stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Registers youth and records attendance
    Operative,
    /// Manages services and reads attendance reports
    Admin,
    /// Full control, including users and barrios
    Root,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Root, Role::Admin, Role::Operative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Operative => "OPERATIVE",
            Role::Admin => "ADMIN",
            Role::Root => "ROOT",
        }
    }

    /// Sort rank used when listing users (ROOT first)
    pub fn rank(&self) -> u8 {
        match self {
            Role::Root => 0,
            Role::Admin => 1,
            Role::Operative => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OPERATIVE" => Ok(Role::Operative),
            "ADMIN" => Ok(Role::Admin),
            "ROOT" => Ok(Role::Root),
            _ => Err(RoleParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleParseError(pub String);

impl fmt::Display for RoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid role '{}': must be ROOT, ADMIN or OPERATIVE", self.0)
    }
}

impl std::error::Error for RoleParseError {}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The authenticated account as seen by the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrincipalInfo {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub principal: PrincipalInfo,
    pub success_message: String,
}

/// Body returned when the session guard forces a logout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionNotice {
    pub reason: String,
    pub message: String,
    /// Where the client should send the user next
    pub redirect: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageResponse {
    pub success_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardResponse {
    pub principal: PrincipalInfo,
    pub active_service_count: u32,
    pub active_services: Vec<Service>,
}

// ---------------------------------------------------------------------------
// Youth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Youth {
    /// National ID, digits only (8 or 9 digits)
    pub cedula: String,
    pub full_name: String,
    /// Digits only (8 digits)
    pub phone: String,
    pub barrio_id: i64,
    pub birth_date: Option<String>, // ISO 8601 date format (YYYY-MM-DD)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateYouthRequest {
    pub cedula: String,
    pub full_name: String,
    pub phone: String,
    pub barrio_id: i64,
    pub birth_date: String, // ISO 8601 date format (YYYY-MM-DD)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateYouthRequest {
    pub full_name: String,
    pub phone: String,
    pub barrio_id: i64,
    pub birth_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YouthResponse {
    pub youth: Youth,
    pub success_message: String,
}

/// One row of the youth listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YouthListRow {
    pub youth: Youth,
    pub barrio_name: Option<String>,
    pub cedula_display: String,
    pub phone_display: String,
    pub whatsapp_link: String,
    pub age: Option<u32>,
    /// Distinct services attended; only present for ADMIN and ROOT
    pub attendance_count: Option<u32>,
    /// Consecutive most recent services attended; only present for ADMIN and ROOT
    pub streak: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YouthListResponse {
    pub rows: Vec<YouthListRow>,
    pub total: u32,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// ---------------------------------------------------------------------------
// Barrios
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Barrio {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarrioNameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarrioResponse {
    pub barrio: Barrio,
    pub success_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BarrioListResponse {
    pub barrios: Vec<Barrio>,
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub service_date: String, // YYYY-MM-DD
    pub starts_at: String,    // YYYY-MM-DDTHH:MM:SS, local time
    pub ends_at: Option<String>,
    pub is_active: bool,
    pub created_by: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateServiceRequest {
    pub title: String,
    pub service_date: String, // YYYY-MM-DD
    pub start_time: String,   // HH:MM
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceResponse {
    pub service: Service,
    pub success_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceListResponse {
    pub services: Vec<Service>,
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterAttendanceRequest {
    pub cedula: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceEntry {
    pub youth: Youth,
    pub registered_at: String,
    /// Username of the operator who recorded the mark (report view only)
    pub registered_by: Option<String>,
    pub barrio_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterAttendanceResponse {
    pub entry: AttendanceEntry,
    pub success_message: String,
}

/// Live attendance view used while a service is running
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveAttendanceResponse {
    pub service: Service,
    pub entries: Vec<AttendanceEntry>,
    pub query: String,
    pub candidates: Vec<Youth>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceReportResponse {
    pub service: Service,
    pub entries: Vec<AttendanceEntry>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub is_active: bool,
    pub last_seen_at: Option<String>, // RFC 3339 timestamp
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateUserRequest {
    pub username: String,
    pub role: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    pub user: User,
    pub success_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("ROOT".parse::<Role>().unwrap(), Role::Root);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("Operative".parse::<Role>().unwrap(), Role::Operative);
        assert!("SUPERUSER".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Operative).unwrap();
        assert_eq!(json, "\"OPERATIVE\"");

        let parsed: Role = serde_json::from_str("\"ROOT\"").unwrap();
        assert_eq!(parsed, Role::Root);
    }

    #[test]
    fn test_role_rank_orders_root_first() {
        let mut roles = vec![Role::Operative, Role::Root, Role::Admin];
        roles.sort_by_key(|r| r.rank());
        assert_eq!(roles, vec![Role::Root, Role::Admin, Role::Operative]);
    }
}
