use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

use super::{Email, InviteId, UserId, UserRole, ValidationError, WorkspaceId};

pub const INVITE_TTL_DAYS: i64 = 7;
const INVITE_TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct InviteToken(Secret<String>);

impl PartialEq for InviteToken {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl InviteToken {
    pub fn parse(token: Secret<String>) -> Result<Self, ValidationError> {
        let value = token.expose_secret();
        if value.len() != INVITE_TOKEN_LENGTH
            || !value.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ValidationError::new(String::from(
                "Invalid invite token",
            )));
        }
        Ok(Self(token))
    }
}

impl Default for InviteToken {
    fn default() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(INVITE_TOKEN_LENGTH)
            .map(char::from)
            .collect();
        Self(Secret::new(token))
    }
}

impl AsRef<Secret<String>> for InviteToken {
    fn as_ref(&self) -> &Secret<String> {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteState {
    Pending,
    Accepted,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceInvite {
    pub id: InviteId,
    #[serde(skip_serializing)]
    pub workspace_id: WorkspaceId,
    pub email: Email,
    pub role: UserRole,
    #[serde(skip_serializing)]
    pub token: InviteToken,
    pub invited_by: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

impl WorkspaceInvite {
    pub fn new(
        workspace_id: WorkspaceId,
        email: Email,
        role: UserRole,
        invited_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if role == UserRole::Owner {
            return Err(ValidationError::new(String::from(
                "Invites cannot grant the owner role",
            )));
        }
        Ok(Self {
            id: InviteId::default(),
            workspace_id,
            email,
            role,
            token: InviteToken::default(),
            invited_by,
            created_at: now,
            expires_at: now + Duration::days(INVITE_TTL_DAYS),
            accepted_at: None,
        })
    }

    pub fn state(&self, now: DateTime<Utc>) -> InviteState {
        if self.accepted_at.is_some() {
            InviteState::Accepted
        } else if self.expires_at <= now {
            InviteState::Expired
        } else {
            InviteState::Pending
        }
    }

    pub fn is_pending(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == InviteState::Pending
    }
}
