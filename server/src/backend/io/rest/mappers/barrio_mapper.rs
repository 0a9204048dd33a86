use shared::Barrio;

use crate::backend::domain::models::barrio::Barrio as DomainBarrio;

pub struct BarrioMapper;

impl BarrioMapper {
    pub fn to_dto(domain: DomainBarrio) -> Barrio {
        Barrio {
            id: domain.id,
            name: domain.name,
            is_active: domain.is_active,
        }
    }

    pub fn to_dto_list(domain_barrios: Vec<DomainBarrio>) -> Vec<Barrio> {
        domain_barrios.into_iter().map(Self::to_dto).collect()
    }
}
