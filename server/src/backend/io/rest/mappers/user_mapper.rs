use chrono::SecondsFormat;
use shared::User;

use crate::backend::domain::models::user::User as DomainUser;

pub struct UserMapper;

impl UserMapper {
    /// Password hash and session token never leave the server
    pub fn to_dto(domain: DomainUser) -> User {
        User {
            id: domain.id,
            username: domain.username,
            role: domain.role,
            is_active: domain.is_active,
            last_seen_at: domain
                .last_seen_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }

    pub fn to_dto_list(domain_users: Vec<DomainUser>) -> Vec<User> {
        domain_users.into_iter().map(Self::to_dto).collect()
    }
}
