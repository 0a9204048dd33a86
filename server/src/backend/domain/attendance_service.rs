//! Taking attendance during an open service, and the per-service report.
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::domain::authorization::Operation;
use crate::backend::domain::commands::attendance::{AttendanceReport, LiveAttendanceResult};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::attendance::{AttendanceRecord, RegisterOutcome, RegistrationOrder};
use crate::backend::domain::models::user::Principal;
use crate::backend::domain::models::youth::YouthSearch;
use crate::backend::domain::service_manager::ServiceManager;
use crate::backend::domain::validation::normalize_cedula;
use crate::backend::storage::{AttendanceStorage, BarrioStorage, YouthStorage};

/// Maximum candidates offered by the live search box
pub const CANDIDATE_LIMIT: u32 = 20;

#[derive(Clone)]
pub struct AttendanceService {
    attendance: Arc<dyn AttendanceStorage>,
    youth: Arc<dyn YouthStorage>,
    barrios: Arc<dyn BarrioStorage>,
    service_manager: ServiceManager,
}

impl AttendanceService {
    pub fn new(
        attendance: Arc<dyn AttendanceStorage>,
        youth: Arc<dyn YouthStorage>,
        barrios: Arc<dyn BarrioStorage>,
        service_manager: ServiceManager,
    ) -> Self {
        Self {
            attendance,
            youth,
            barrios,
            service_manager,
        }
    }

    /// Everyone registered so far for an open service (newest first), plus
    /// youth matching `query` to pick from
    pub async fn live_view(&self, principal: &Principal, service_id: i64, query: &str) -> DomainResult<LiveAttendanceResult> {
        principal.authorize(Operation::TakeAttendance)?;

        let service = self.service_manager.require_active(service_id).await?;
        let entries = self
            .attendance
            .list_for_service(service.id, RegistrationOrder::NewestFirst)
            .await?;

        let search = YouthSearch::from_query(query);
        let candidates = if search.is_empty() {
            Vec::new()
        } else {
            self.youth
                .search_youth(&search, CANDIDATE_LIMIT)
                .await?
                .into_iter()
                .map(|r| r.youth)
                .collect()
        };

        Ok(LiveAttendanceResult {
            service,
            entries,
            query: query.trim().to_string(),
            candidates,
        })
    }

    /// Mark a youth present at an open service
    pub async fn register(&self, principal: &Principal, service_id: i64, raw_cedula: &str) -> DomainResult<AttendanceRecord> {
        principal.authorize(Operation::TakeAttendance)?;

        let service = self.service_manager.require_active(service_id).await?;
        let cedula = normalize_cedula(raw_cedula)?;

        let youth = self.youth.get_youth(&cedula).await?.ok_or_else(|| {
            warn!("Attendance for unknown cédula {}", cedula);
            DomainError::not_found("No youth with that cédula exists. Register them first.")
        })?;

        let mark = match self
            .attendance
            .register_attendance(service.id, &cedula, principal.id, Utc::now())
            .await?
        {
            RegisterOutcome::Registered(mark) => mark,
            RegisterOutcome::AlreadyRegistered => {
                return Err(DomainError::conflict("Already registered for this service"));
            }
        };

        let barrio_name = self.barrios.get_barrio(youth.barrio_id).await?.map(|b| b.name);

        info!(
            "{} registered {} for service '{}'",
            principal.username, cedula, service.title
        );

        Ok(AttendanceRecord {
            mark,
            youth,
            barrio_name,
            registered_by_username: Some(principal.username.clone()),
        })
    }

    /// Full attendance of a service in registration order, open or not
    pub async fn report(&self, principal: &Principal, service_id: i64) -> DomainResult<AttendanceReport> {
        principal.authorize(Operation::ViewAttendanceReport)?;

        let service = self.service_manager.get_service(service_id).await?;
        let entries = self
            .attendance
            .list_for_service(service.id, RegistrationOrder::OldestFirst)
            .await?;

        Ok(AttendanceReport { service, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::commands::services::CreateServiceCommand;
    use crate::backend::domain::models::youth::Youth;
    use crate::backend::domain::test_utils::{setup_stores, TestStores};
    use shared::Role;

    struct Fixture {
        _stores: TestStores,
        service: AttendanceService,
        manager: ServiceManager,
        admin: Principal,
        operative: Principal,
        service_id: i64,
    }

    async fn setup_test() -> Fixture {
        let stores = setup_stores().await;
        let admin = stores.seed_principal("admin", Role::Admin).await;
        let operative = stores.seed_principal("op", Role::Operative).await;
        let barrio_id = stores.seed_barrio("Alaska").await;

        for (cedula, name) in [("112340567", "Maria Rojas"), ("298760001", "Jose Mora")] {
            stores
                .youth
                .store_youth(&Youth {
                    cedula: cedula.to_string(),
                    full_name: name.to_string(),
                    phone: "88887777".to_string(),
                    barrio_id,
                    birth_date: None,
                })
                .await
                .unwrap();
        }

        let manager = ServiceManager::new(stores.services.clone());
        let created = manager
            .create_service(
                &admin,
                CreateServiceCommand {
                    title: "Culto".to_string(),
                    service_date: "2024-05-03".to_string(),
                    start_time: "19:00".to_string(),
                },
            )
            .await
            .unwrap();
        manager.toggle_service(&admin, created.id).await.unwrap();

        let service = AttendanceService::new(
            stores.attendance.clone(),
            stores.youth.clone(),
            stores.barrios.clone(),
            manager.clone(),
        );

        Fixture {
            _stores: stores,
            service,
            manager,
            admin,
            operative,
            service_id: created.id,
        }
    }

    #[tokio::test]
    async fn test_register_and_duplicate() {
        let f = setup_test().await;

        let record = f.service.register(&f.operative, f.service_id, "1-1234-0567").await.unwrap();
        assert_eq!(record.youth.full_name, "Maria Rojas");
        assert_eq!(record.barrio_name.as_deref(), Some("Alaska"));
        assert_eq!(record.mark.registered_by, f.operative.id);

        assert!(matches!(
            f.service.register(&f.operative, f.service_id, "112340567").await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_cedula_and_unknown_youth() {
        let f = setup_test().await;

        assert!(matches!(
            f.service.register(&f.operative, f.service_id, "123").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            f.service.register(&f.operative, f.service_id, "999999999").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_service_rejects_attendance() {
        let f = setup_test().await;
        f.manager.toggle_service(&f.admin, f.service_id).await.unwrap();

        assert!(matches!(
            f.service.register(&f.operative, f.service_id, "112340567").await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            f.service.live_view(&f.operative, f.service_id, "").await,
            Err(DomainError::NotFound(_))
        ));

        // The report still works once the service is closed
        assert!(f.service.report(&f.admin, f.service_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_live_view_candidates_and_order() {
        let f = setup_test().await;
        f.service.register(&f.operative, f.service_id, "112340567").await.unwrap();
        f.service.register(&f.operative, f.service_id, "298760001").await.unwrap();

        let view = f.service.live_view(&f.operative, f.service_id, " jose ").await.unwrap();
        assert_eq!(view.query, "jose");
        assert_eq!(view.entries.len(), 2);
        assert_eq!(view.entries[0].youth.cedula, "298760001");
        assert_eq!(view.candidates.len(), 1);
        assert_eq!(view.candidates[0].full_name, "Jose Mora");

        let empty = f.service.live_view(&f.operative, f.service_id, "").await.unwrap();
        assert!(empty.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_report_is_for_managers_only() {
        let f = setup_test().await;
        f.service.register(&f.operative, f.service_id, "112340567").await.unwrap();
        f.service.register(&f.operative, f.service_id, "298760001").await.unwrap();

        let report = f.service.report(&f.admin, f.service_id).await.unwrap();
        assert_eq!(report.entries[0].youth.cedula, "112340567");
        assert_eq!(report.entries[0].registered_by_username.as_deref(), Some("op"));

        assert!(matches!(
            f.service.report(&f.operative, f.service_id).await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(f.service.report(&f.admin, 999).await, Err(DomainError::NotFound(_))));
    }
}
