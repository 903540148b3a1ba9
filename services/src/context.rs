use crate::error::{ServiceError, ServiceResult};
use db::models::activity;
use db::models::user::Role;
use serde::{Deserialize, Serialize};

/// Who is performing an operation. Passed explicitly to every mutating call and
/// recorded as `reviewed_by` / `checked_in_by` / `issued_by`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActingUser {
    pub id: i64,
    pub role: Role,
}

impl ActingUser {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn can_create_activities(&self) -> bool {
        matches!(self.role, Role::Professor | Role::Admin)
    }

    /// Admins review everything; professors review what they created.
    pub fn can_review(&self, activity: &activity::Model) -> bool {
        self.is_admin() || activity.is_owned_by(self.id)
    }

    pub fn require_reviewer(&self, activity: &activity::Model) -> ServiceResult<()> {
        if self.can_review(activity) {
            Ok(())
        } else {
            Err(ServiceError::forbidden(
                "Only the activity owner or an admin can do this",
            ))
        }
    }
}
