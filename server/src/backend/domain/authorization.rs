//! Role allow-lists for every protected operation.
use shared::Role;

use super::errors::{DomainError, DomainResult};
use super::models::user::Principal;

const ANY_ROLE: &[Role] = &[Role::Operative, Role::Admin, Role::Root];
const MANAGERS: &[Role] = &[Role::Admin, Role::Root];
const ROOT_ONLY: &[Role] = &[Role::Root];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewDashboard,
    ListYouth,
    /// Attendance count and streak columns in the youth listing
    ViewYouthStats,
    CreateYouth,
    ViewYouth,
    UpdateYouth,
    DeleteYouth,
    ListActiveBarrios,
    ManageBarrios,
    ListActiveServices,
    ManageServices,
    TakeAttendance,
    ViewAttendanceReport,
    ExportAttendance,
    ManageUsers,
}

impl Operation {
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::ViewDashboard
            | Operation::ListYouth
            | Operation::CreateYouth
            | Operation::ViewYouth
            | Operation::UpdateYouth
            | Operation::ListActiveBarrios
            | Operation::ListActiveServices
            | Operation::TakeAttendance => ANY_ROLE,
            Operation::ViewYouthStats
            | Operation::ManageServices
            | Operation::ViewAttendanceReport
            | Operation::ExportAttendance => MANAGERS,
            Operation::DeleteYouth | Operation::ManageBarrios | Operation::ManageUsers => ROOT_ONLY,
        }
    }

    pub fn is_allowed_for(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

impl Principal {
    /// Fail with `Forbidden` unless this principal's role may perform `operation`
    pub fn authorize(&self, operation: Operation) -> DomainResult<()> {
        if operation.is_allowed_for(self.role) {
            Ok(())
        } else {
            tracing::warn!(
                "Denied {:?} to {} ({})",
                operation,
                self.username,
                self.role
            );
            Err(DomainError::forbidden("You do not have permission to perform this action"))
        }
    }

    pub fn can(&self, operation: Operation) -> bool {
        operation.is_allowed_for(self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Role) -> Principal {
        Principal {
            id: 1,
            username: "someone".to_string(),
            role,
        }
    }

    #[test]
    fn test_operative_limits() {
        let op = principal(Role::Operative);
        assert!(op.authorize(Operation::TakeAttendance).is_ok());
        assert!(op.authorize(Operation::CreateYouth).is_ok());
        assert!(matches!(op.authorize(Operation::ManageServices), Err(DomainError::Forbidden(_))));
        assert!(matches!(op.authorize(Operation::DeleteYouth), Err(DomainError::Forbidden(_))));
        assert!(!op.can(Operation::ViewYouthStats));
    }

    #[test]
    fn test_admin_limits() {
        let admin = principal(Role::Admin);
        assert!(admin.authorize(Operation::ManageServices).is_ok());
        assert!(admin.authorize(Operation::ExportAttendance).is_ok());
        assert!(admin.can(Operation::ViewYouthStats));
        assert!(admin.authorize(Operation::ManageUsers).is_err());
        assert!(admin.authorize(Operation::ManageBarrios).is_err());
        assert!(admin.authorize(Operation::DeleteYouth).is_err());
    }

    #[test]
    fn test_root_may_do_everything() {
        let root = principal(Role::Root);
        for op in [
            Operation::ViewDashboard,
            Operation::DeleteYouth,
            Operation::ManageBarrios,
            Operation::ManageServices,
            Operation::ExportAttendance,
            Operation::ManageUsers,
        ] {
            assert!(root.authorize(op).is_ok(), "{:?}", op);
        }
    }
}
