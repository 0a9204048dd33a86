//! Domain-level command and result types.
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the DTOs defined in the
//! `shared` crate to and from these internal types.

pub mod auth {
    use crate::backend::domain::models::user::Principal;

    #[derive(Debug, Clone)]
    pub struct LoginCommand {
        pub username: String,
        pub password: String,
    }

    /// A successful login: who logged in and the token now stored for them
    #[derive(Debug, Clone)]
    pub struct LoginResult {
        pub principal: Principal,
        pub token: String,
    }
}

pub mod youth {
    use crate::backend::domain::models::youth::YouthWithBarrio;

    #[derive(Debug, Clone)]
    pub struct CreateYouthCommand {
        pub cedula: String,
        pub full_name: String,
        pub phone: String,
        pub barrio_id: i64,
        pub birth_date: String,
    }

    /// Editable fields; the cédula never changes
    #[derive(Debug, Clone)]
    pub struct UpdateYouthCommand {
        pub full_name: String,
        pub phone: String,
        pub barrio_id: i64,
        pub birth_date: String,
    }

    #[derive(Debug, Clone)]
    pub struct YouthListRow {
        pub record: YouthWithBarrio,
        /// Only filled in for principals allowed to see attendance stats
        pub attendance_count: Option<u32>,
        pub streak: Option<u32>,
    }

    #[derive(Debug, Clone)]
    pub struct YouthListResult {
        pub rows: Vec<YouthListRow>,
        pub total: u32,
        pub query: String,
    }
}

pub mod services {
    #[derive(Debug, Clone)]
    pub struct CreateServiceCommand {
        pub title: String,
        /// `YYYY-MM-DD`
        pub service_date: String,
        /// `HH:MM`
        pub start_time: String,
    }
}

pub mod attendance {
    use crate::backend::domain::models::attendance::AttendanceRecord;
    use crate::backend::domain::models::service::Service;
    use crate::backend::domain::models::youth::Youth;

    #[derive(Debug, Clone)]
    pub struct LiveAttendanceResult {
        pub service: Service,
        /// Newest registration first
        pub entries: Vec<AttendanceRecord>,
        pub query: String,
        pub candidates: Vec<Youth>,
    }

    #[derive(Debug, Clone)]
    pub struct AttendanceReport {
        pub service: Service,
        /// Oldest registration first
        pub entries: Vec<AttendanceRecord>,
    }

    /// A rendered CSV file ready to be sent as a download
    #[derive(Debug, Clone)]
    pub struct CsvExport {
        pub file_name: String,
        pub content: String,
        pub row_count: usize,
    }
}

pub mod users {
    #[derive(Debug, Clone)]
    pub struct CreateUserCommand {
        pub username: String,
        pub role: String,
        pub password: String,
    }
}

pub mod dashboard {
    use crate::backend::domain::models::service::Service;
    use crate::backend::domain::models::user::Principal;

    #[derive(Debug, Clone)]
    pub struct DashboardResult {
        pub principal: Principal,
        pub active_services: Vec<Service>,
    }
}
