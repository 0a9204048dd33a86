use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::domain::authorization::Operation;
use crate::backend::domain::errors::{DomainError, DomainResult};
use crate::backend::domain::models::barrio::Barrio;
use crate::backend::domain::models::user::Principal;
use crate::backend::storage::BarrioStorage;

/// Neighborhoods offered when registering youth
pub const DEFAULT_BARRIOS: &[&str] = &[
    "Alaska",
    "Ángeles",
    "Buenos Aires",
    "Capulín",
    "Cerros",
    "Condega",
    "Corazón de Jesús",
    "Curime",
    "Choricera",
    "Chorotega",
    "Gallera",
    "Guaria",
    "Jícaro",
    "La Carreta",
    "Llano La Cruz",
    "Mocho (Santa Lucía)",
    "Moracia",
    "Nazareth",
    "Pueblo Nuevo",
    "Sabanero",
    "San Miguel",
    "San Roque",
    "Sitio",
    "Veinticinco de Julio",
    "Victoria",
    "Villanueva",
    "Martina Bustos",
    "El Regalito",
    "San Rafael",
    "Gallo",
    "Bagaces",
    "Felipe Pérez",
];

/// Service for managing barrios
#[derive(Clone)]
pub struct BarrioService {
    barrios: Arc<dyn BarrioStorage>,
}

impl BarrioService {
    pub fn new(barrios: Arc<dyn BarrioStorage>) -> Self {
        Self { barrios }
    }

    pub async fn list_barrios(&self, principal: &Principal) -> DomainResult<Vec<Barrio>> {
        principal.authorize(Operation::ManageBarrios)?;
        Ok(self.barrios.list_barrios().await?)
    }

    pub async fn list_active_barrios(&self, principal: &Principal) -> DomainResult<Vec<Barrio>> {
        principal.authorize(Operation::ListActiveBarrios)?;
        Ok(self.barrios.list_active_barrios().await?)
    }

    pub async fn create_barrio(&self, principal: &Principal, raw_name: &str) -> DomainResult<Barrio> {
        principal.authorize(Operation::ManageBarrios)?;

        let name = self.checked_name(raw_name, None).await?;
        let id = self.barrios.create_barrio(&name).await?;

        info!("{} created barrio {}", principal.username, name);
        self.require_barrio(id).await
    }

    pub async fn rename_barrio(&self, principal: &Principal, barrio_id: i64, raw_name: &str) -> DomainResult<Barrio> {
        principal.authorize(Operation::ManageBarrios)?;

        let current = self.require_barrio(barrio_id).await?;
        let name = self.checked_name(raw_name, Some(barrio_id)).await?;
        self.barrios.rename_barrio(barrio_id, &name).await?;

        info!("{} renamed barrio {} to {}", principal.username, current.name, name);
        self.require_barrio(barrio_id).await
    }

    pub async fn toggle_barrio(&self, principal: &Principal, barrio_id: i64) -> DomainResult<Barrio> {
        principal.authorize(Operation::ManageBarrios)?;

        let barrio = self.require_barrio(barrio_id).await?;
        self.barrios.set_active(barrio_id, !barrio.is_active).await?;

        info!("{} set barrio {} active={}", principal.username, barrio.name, !barrio.is_active);
        self.require_barrio(barrio_id).await
    }

    /// Insert every default barrio that does not exist yet; returns how many were added
    pub async fn seed_defaults(&self) -> DomainResult<usize> {
        let mut created = 0;
        for name in DEFAULT_BARRIOS {
            if self.barrios.find_by_name(name, None).await?.is_none() {
                self.barrios.create_barrio(name).await?;
                created += 1;
            }
        }
        info!("Seeded {} barrios", created);
        Ok(created)
    }

    async fn checked_name(&self, raw_name: &str, excluding: Option<i64>) -> DomainResult<String> {
        let name = Barrio::normalize_name(raw_name);
        if name.is_empty() {
            return Err(DomainError::validation("Enter the barrio name"));
        }
        if self.barrios.find_by_name(&name, excluding).await?.is_some() {
            warn!("Barrio name already taken: {}", name);
            return Err(DomainError::conflict("A barrio with that name already exists"));
        }
        Ok(name)
    }

    async fn require_barrio(&self, barrio_id: i64) -> DomainResult<Barrio> {
        self.barrios
            .get_barrio(barrio_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Barrio not found: {}", barrio_id)))
    }
}
