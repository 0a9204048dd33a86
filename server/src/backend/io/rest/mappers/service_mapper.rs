use shared::Service;

use crate::backend::domain::models::service::{Service as DomainService, SERVICE_TIMESTAMP_FORMAT};

pub struct ServiceMapper;

impl ServiceMapper {
    /// Dates as `YYYY-MM-DD`, local times as `YYYY-MM-DDTHH:MM:SS`
    pub fn to_dto(domain: DomainService) -> Service {
        Service {
            id: domain.id,
            title: domain.title,
            service_date: domain.service_date.format("%Y-%m-%d").to_string(),
            starts_at: domain.starts_at.format(SERVICE_TIMESTAMP_FORMAT).to_string(),
            ends_at: domain
                .ends_at
                .map(|t| t.format(SERVICE_TIMESTAMP_FORMAT).to_string()),
            is_active: domain.is_active,
            created_by: domain.created_by,
        }
    }

    pub fn to_dto_list(domain_services: Vec<DomainService>) -> Vec<Service> {
        domain_services.into_iter().map(Self::to_dto).collect()
    }
}
