use shared::{DashboardResponse, PrincipalInfo};

use crate::backend::domain::commands::dashboard::DashboardResult;
use crate::backend::domain::models::user::Principal;
use crate::backend::io::rest::mappers::service_mapper::ServiceMapper;

pub struct PrincipalMapper;

impl PrincipalMapper {
    pub fn to_dto(principal: &Principal) -> PrincipalInfo {
        PrincipalInfo {
            id: principal.id,
            username: principal.username.clone(),
            role: principal.role,
        }
    }

    pub fn to_dashboard_response(result: DashboardResult) -> DashboardResponse {
        DashboardResponse {
            principal: Self::to_dto(&result.principal),
            active_service_count: result.active_services.len() as u32,
            active_services: ServiceMapper::to_dto_list(result.active_services),
        }
    }
}
