//! Scheduling and opening/closing of services.
use chrono::{Local, NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::domain::authorization::Operation;
use crate::backend::domain::commands::dashboard::DashboardResult;
use crate::backend::domain::commands::services::CreateServiceCommand;
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::service::{NewService, Service};
use crate::backend::domain::models::user::Principal;
use crate::backend::storage::ServiceStorage;

/// How many services the admin listing shows
pub const RECENT_SERVICES_LIMIT: u32 = 200;

#[derive(Clone)]
pub struct ServiceManager {
    services: Arc<dyn ServiceStorage>,
}

impl ServiceManager {
    pub fn new(services: Arc<dyn ServiceStorage>) -> Self {
        Self { services }
    }

    /// Schedule a service. New services start closed.
    pub async fn create_service(&self, principal: &Principal, command: CreateServiceCommand) -> DomainResult<Service> {
        principal.authorize(Operation::ManageServices)?;

        let title = command.title.trim();
        let date = command.service_date.trim();
        let time = command.start_time.trim();
        if title.is_empty() || date.is_empty() || time.is_empty() {
            return Err(DomainError::validation("Title, date and start time are required"));
        }

        let service_date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| DomainError::validation("Service date must use the YYYY-MM-DD format"))?;
        let start_time = NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|_| DomainError::validation("Start time must use the HH:MM format"))?;

        let id = self
            .services
            .create_service(&NewService {
                title: title.to_string(),
                service_date,
                starts_at: service_date.and_time(start_time),
                created_by: principal.id,
            })
            .await?;

        info!("{} created service '{}' on {}", principal.username, title, service_date);
        self.require_service(id).await
    }

    /// Open a closed service or close an open one. Closing records the end time.
    pub async fn toggle_service(&self, principal: &Principal, service_id: i64) -> DomainResult<Service> {
        principal.authorize(Operation::ManageServices)?;

        let service = self.require_service(service_id).await?;
        let now_active = !service.is_active;
        let ends_at = (!now_active).then(|| Local::now().naive_local());

        self.services.set_active(service_id, now_active, ends_at).await?;

        info!("{} set service '{}' active={}", principal.username, service.title, now_active);
        self.require_service(service_id).await
    }

    pub async fn list_recent(&self, principal: &Principal) -> DomainResult<Vec<Service>> {
        principal.authorize(Operation::ManageServices)?;
        Ok(self.services.list_recent_services(RECENT_SERVICES_LIMIT).await?)
    }

    pub async fn list_active(&self, principal: &Principal) -> DomainResult<Vec<Service>> {
        principal.authorize(Operation::ListActiveServices)?;
        Ok(self.services.list_active_services().await?)
    }

    /// Landing page data: who is logged in and which services are open right now
    pub async fn dashboard(&self, principal: &Principal) -> DomainResult<DashboardResult> {
        principal.authorize(Operation::ViewDashboard)?;
        let active_services = self.services.list_active_services().await?;
        Ok(DashboardResult {
            principal: principal.clone(),
            active_services,
        })
    }

    pub async fn get_service(&self, service_id: i64) -> DomainResult<Service> {
        self.require_service(service_id).await
    }

    /// The service, provided it is currently open for attendance
    pub async fn require_active(&self, service_id: i64) -> DomainResult<Service> {
        match self.services.get_service(service_id).await? {
            Some(service) if service.is_active => Ok(service),
            _ => {
                warn!("Service {} is not available for attendance", service_id);
                Err(DomainError::not_found("Service not available or not active"))
            }
        }
    }

    async fn require_service(&self, service_id: i64) -> DomainResult<Service> {
        self.services
            .get_service(service_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Service not found: {}", service_id)))
    }
}
