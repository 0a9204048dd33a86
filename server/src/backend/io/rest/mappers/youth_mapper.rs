use chrono::NaiveDate;
use shared::format::{age_on, format_cedula, format_phone, whatsapp_link};
use shared::{Youth, YouthListResponse, YouthListRow};

use crate::backend::domain::commands::youth::{
    CreateYouthCommand, UpdateYouthCommand, YouthListResult, YouthListRow as DomainYouthListRow,
};
use crate::backend::domain::models::youth::Youth as DomainYouth;

pub struct YouthMapper;

impl YouthMapper {
    pub fn to_dto(domain: DomainYouth) -> Youth {
        Youth {
            cedula: domain.cedula,
            full_name: domain.full_name,
            phone: domain.phone,
            barrio_id: domain.barrio_id,
            birth_date: domain.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }

    pub fn to_dto_list(domain_youth: Vec<DomainYouth>) -> Vec<Youth> {
        domain_youth.into_iter().map(Self::to_dto).collect()
    }

    pub fn to_create_command(request: shared::CreateYouthRequest) -> CreateYouthCommand {
        CreateYouthCommand {
            cedula: request.cedula,
            full_name: request.full_name,
            phone: request.phone,
            barrio_id: request.barrio_id,
            birth_date: request.birth_date,
        }
    }

    pub fn to_update_command(request: shared::UpdateYouthRequest) -> UpdateYouthCommand {
        UpdateYouthCommand {
            full_name: request.full_name,
            phone: request.phone,
            barrio_id: request.barrio_id,
            birth_date: request.birth_date,
        }
    }

    /// A listing row with the display forms the UI shows; `today` drives the age column
    pub fn to_list_row(row: DomainYouthListRow, today: NaiveDate) -> YouthListRow {
        let youth = row.record.youth;
        YouthListRow {
            cedula_display: format_cedula(&youth.cedula),
            phone_display: format_phone(&youth.phone),
            whatsapp_link: whatsapp_link(&youth.phone),
            age: youth.birth_date.map(|b| age_on(b, today)),
            barrio_name: row.record.barrio_name,
            attendance_count: row.attendance_count,
            streak: row.streak,
            youth: Self::to_dto(youth),
        }
    }

    pub fn to_list_response(result: YouthListResult, today: NaiveDate) -> YouthListResponse {
        YouthListResponse {
            rows: result
                .rows
                .into_iter()
                .map(|row| Self::to_list_row(row, today))
                .collect(),
            total: result.total,
            query: result.query,
        }
    }
}
