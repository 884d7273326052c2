use crate::domain::{User, UserRole, WorkspaceAPIError};

/// Rejects users whose role is below `required`.
pub fn require_role(user: &User, required: UserRole) -> Result<(), WorkspaceAPIError> {
    if user.role.satisfies(required) {
        Ok(())
    } else {
        Err(WorkspaceAPIError::Forbidden(format!(
            "This action requires the {required} role"
        )))
    }
}
