//! CSV export of a service's attendance.
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use shared::format::{format_cedula, format_phone, whatsapp_link};

use crate::backend::domain::authorization::Operation;
use crate::backend::domain::commands::attendance::CsvExport;
use crate::backend::domain::errors::DomainResult;
use crate::backend::domain::models::attendance::{AttendanceRecord, RegistrationOrder};
use crate::backend::domain::models::user::Principal;
use crate::backend::domain::service_manager::ServiceManager;
use crate::backend::storage::AttendanceStorage;

pub const CSV_HEADER: [&str; 5] = ["cedula", "nombre", "contacto", "barrio", "whatsapp"];

#[derive(Clone)]
pub struct ExportService {
    attendance: Arc<dyn AttendanceStorage>,
    service_manager: ServiceManager,
}

impl ExportService {
    pub fn new(attendance: Arc<dyn AttendanceStorage>, service_manager: ServiceManager) -> Self {
        Self {
            attendance,
            service_manager,
        }
    }

    /// Render the attendance of a service as `asistencia_<date>.csv`
    pub async fn export_attendance_csv(&self, principal: &Principal, service_id: i64) -> DomainResult<CsvExport> {
        principal.authorize(Operation::ExportAttendance)?;

        let service = self.service_manager.get_service(service_id).await?;
        let records = self
            .attendance
            .list_for_service(service.id, RegistrationOrder::OldestFirst)
            .await?;

        let content = render_attendance_csv(&records)?;
        let file_name = format!("asistencia_{}.csv", service.service_date.format("%Y-%m-%d"));

        info!(
            "{} exported {} attendance rows for service '{}'",
            principal.username,
            records.len(),
            service.title
        );

        Ok(CsvExport {
            file_name,
            content,
            row_count: records.len(),
        })
    }
}

/// One row per record: formatted cédula, name, formatted phone, barrio, WhatsApp link
pub fn render_attendance_csv(records: &[AttendanceRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let youth = &record.youth;
        writer.write_record([
            format_cedula(&youth.cedula).as_str(),
            youth.full_name.as_str(),
            format_phone(&youth.phone).as_str(),
            record.barrio_name.as_deref().unwrap_or(""),
            whatsapp_link(&youth.phone).as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow::anyhow!("Failed to finish CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}
