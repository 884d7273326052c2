use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{Email, Name, UserId, UserPasswordHash, ValidationError, WorkspaceId};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Admin,
    Owner,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Admin => "admin",
            UserRole::Owner => "owner",
        }
    }

    /// Roles are ordered, so an owner satisfies an admin requirement.
    pub fn satisfies(&self, required: UserRole) -> bool {
        *self >= required
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(UserRole::Member),
            "admin" => Ok(UserRole::Admin),
            "owner" => Ok(UserRole::Owner),
            _ => Err(ValidationError::new(format!("Invalid role: {s}"))),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub workspace_id: WorkspaceId,
    pub email: Email,
    pub name: Name,
    pub hash: UserPasswordHash,
    pub role: UserRole,
    pub active: bool,
}

impl User {
    pub fn new(
        workspace_id: WorkspaceId,
        email: Email,
        name: Name,
        hash: UserPasswordHash,
        role: UserRole,
    ) -> Self {
        Self {
            id: UserId::default(),
            workspace_id,
            email,
            name,
            hash,
            role,
            active: true,
        }
    }
}

/// The public view of a user, without credentials.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub name: Name,
    pub role: UserRole,
    pub active: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            active: user.active,
        }
    }
}
