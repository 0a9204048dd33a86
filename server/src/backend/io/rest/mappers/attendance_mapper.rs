use chrono::SecondsFormat;
use shared::{AttendanceEntry, AttendanceReportResponse, LiveAttendanceResponse};

use crate::backend::domain::commands::attendance::{AttendanceReport, LiveAttendanceResult};
use crate::backend::domain::models::attendance::AttendanceRecord;
use crate::backend::io::rest::mappers::service_mapper::ServiceMapper;
use crate::backend::io::rest::mappers::youth_mapper::YouthMapper;

pub struct AttendanceMapper;

impl AttendanceMapper {
    pub fn to_entry(record: AttendanceRecord) -> AttendanceEntry {
        AttendanceEntry {
            youth: YouthMapper::to_dto(record.youth),
            registered_at: record
                .mark
                .registered_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            registered_by: record.registered_by_username,
            barrio_name: record.barrio_name,
        }
    }

    pub fn to_entry_list(records: Vec<AttendanceRecord>) -> Vec<AttendanceEntry> {
        records.into_iter().map(Self::to_entry).collect()
    }

    pub fn to_live_response(result: LiveAttendanceResult) -> LiveAttendanceResponse {
        LiveAttendanceResponse {
            service: ServiceMapper::to_dto(result.service),
            entries: Self::to_entry_list(result.entries),
            query: result.query,
            candidates: YouthMapper::to_dto_list(result.candidates),
        }
    }

    pub fn to_report_response(report: AttendanceReport) -> AttendanceReportResponse {
        AttendanceReportResponse {
            service: ServiceMapper::to_dto(report.service),
            entries: Self::to_entry_list(report.entries),
        }
    }
}
