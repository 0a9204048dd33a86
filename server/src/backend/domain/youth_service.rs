use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

use shared::format::digits_only;

use crate::backend::domain::authorization::Operation;
use crate::backend::domain::commands::youth::{
    CreateYouthCommand, UpdateYouthCommand, YouthListResult, YouthListRow,
};
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::user::Principal;
use crate::backend::domain::models::youth::{Youth, YouthSearch, YouthWithBarrio};
use crate::backend::domain::streak_calculator::compute_streaks;
use crate::backend::domain::validation::{
    normalize_cedula, normalize_name, normalize_phone, parse_birth_date,
};
use crate::backend::storage::{AttendanceStorage, BarrioStorage, ServiceStorage, YouthStorage};

/// Maximum rows returned by the youth listing
pub const YOUTH_LIST_LIMIT: u32 = 500;

/// Service for registering and browsing youth
#[derive(Clone)]
pub struct YouthService {
    youth: Arc<dyn YouthStorage>,
    barrios: Arc<dyn BarrioStorage>,
    services: Arc<dyn ServiceStorage>,
    attendance: Arc<dyn AttendanceStorage>,
    max_services_for_streak: usize,
}

impl YouthService {
    pub fn new(
        youth: Arc<dyn YouthStorage>,
        barrios: Arc<dyn BarrioStorage>,
        services: Arc<dyn ServiceStorage>,
        attendance: Arc<dyn AttendanceStorage>,
        max_services_for_streak: usize,
    ) -> Self {
        Self {
            youth,
            barrios,
            services,
            attendance,
            max_services_for_streak,
        }
    }

    /// Search youth by name, or by cédula/phone when the query has digits.
    /// Principals allowed to see stats also get attendance totals and streaks.
    pub async fn list_youth(&self, principal: &Principal, query: &str) -> DomainResult<YouthListResult> {
        principal.authorize(Operation::ListYouth)?;

        let search = YouthSearch::from_query(query);
        let records = self.youth.search_youth(&search, YOUTH_LIST_LIMIT).await?;
        let total = self.youth.count_youth(&search).await?;

        let rows = if principal.can(Operation::ViewYouthStats) {
            self.rows_with_stats(records).await?
        } else {
            records
                .into_iter()
                .map(|record| YouthListRow {
                    record,
                    attendance_count: None,
                    streak: None,
                })
                .collect()
        };

        info!("Listed {} of {} youth for query '{}'", rows.len(), total, query.trim());

        Ok(YouthListResult {
            rows,
            total,
            query: query.trim().to_string(),
        })
    }

    async fn rows_with_stats(&self, records: Vec<YouthWithBarrio>) -> DomainResult<Vec<YouthListRow>> {
        let cedulas: Vec<String> = records.iter().map(|r| r.youth.cedula.clone()).collect();

        // Storage already drops services that have not started yet
        let now = Local::now().naive_local();
        let recent_ids: Vec<i64> = self
            .services
            .list_eligible_services(now, self.max_services_for_streak)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();

        let attended = self.attendance.list_attendance_for(&cedulas, &recent_ids).await?;
        let streaks = compute_streaks(&recent_ids, &attended, &cedulas);
        let counts = self.attendance.attendance_counts(&cedulas).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let cedula = &record.youth.cedula;
                YouthListRow {
                    attendance_count: Some(counts.get(cedula).copied().unwrap_or(0)),
                    streak: Some(streaks.get(cedula).copied().unwrap_or(0)),
                    record,
                }
            })
            .collect())
    }

    pub async fn create_youth(&self, principal: &Principal, command: CreateYouthCommand) -> DomainResult<Youth> {
        principal.authorize(Operation::CreateYouth)?;

        let full_name = normalize_name(&command.full_name)?;
        let cedula = normalize_cedula(&command.cedula)?;
        let phone = normalize_phone(&command.phone)?;
        let birth_date = parse_birth_date(&command.birth_date, Local::now().date_naive())?;
        self.require_active_barrio(command.barrio_id).await?;

        if self.youth.get_youth(&cedula).await?.is_some() {
            warn!("Youth with cédula {} already exists", cedula);
            return Err(DomainError::conflict("A youth with that cédula already exists"));
        }

        let youth = Youth {
            cedula,
            full_name,
            phone,
            barrio_id: command.barrio_id,
            birth_date: Some(birth_date),
        };
        self.youth.store_youth(&youth).await?;

        info!("{} registered youth {}", principal.username, youth.cedula);
        Ok(youth)
    }

    pub async fn get_youth(&self, principal: &Principal, cedula: &str) -> DomainResult<Youth> {
        principal.authorize(Operation::ViewYouth)?;
        self.require_youth(cedula).await
    }

    /// Edit everything except the cédula
    pub async fn update_youth(
        &self,
        principal: &Principal,
        cedula: &str,
        command: UpdateYouthCommand,
    ) -> DomainResult<Youth> {
        principal.authorize(Operation::UpdateYouth)?;

        let mut youth = self.require_youth(cedula).await?;

        let full_name = normalize_name(&command.full_name)?;
        let phone = normalize_phone(&command.phone)?;
        let birth_date = parse_birth_date(&command.birth_date, Local::now().date_naive())?;
        // A youth may stay in a barrio that was deactivated after they joined
        if command.barrio_id != youth.barrio_id {
            self.require_active_barrio(command.barrio_id).await?;
        }

        youth.full_name = full_name;
        youth.phone = phone;
        youth.barrio_id = command.barrio_id;
        youth.birth_date = Some(birth_date);
        self.youth.update_youth(&youth).await?;

        info!("{} updated youth {}", principal.username, youth.cedula);
        Ok(youth)
    }

    /// Remove a youth together with all their attendance marks
    pub async fn delete_youth(&self, principal: &Principal, cedula: &str) -> DomainResult<()> {
        principal.authorize(Operation::DeleteYouth)?;

        let youth = self.require_youth(cedula).await?;
        self.youth.delete_youth_with_attendance(&youth.cedula).await?;

        info!("{} deleted youth {} and their attendance", principal.username, youth.cedula);
        Ok(())
    }

    async fn require_youth(&self, cedula: &str) -> DomainResult<Youth> {
        let cedula = digits_only(cedula);
        self.youth
            .get_youth(&cedula)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Youth not found: {}", cedula)))
    }

    async fn require_active_barrio(&self, barrio_id: i64) -> DomainResult<()> {
        match self.barrios.get_barrio(barrio_id).await? {
            Some(barrio) if barrio.is_active => Ok(()),
            _ => Err(DomainError::validation("Choose an active barrio")),
        }
    }
}
