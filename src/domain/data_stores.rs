use chrono::{DateTime, NaiveDate, Utc};
use color_eyre::eyre::Report;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::{
    Assignment, AssignmentId, DateRange, Email, InviteId, InviteToken,
    Password, Project, ProjectId, Skill, SkillId, TeamMember, TeamMemberId,
    User, UserId, Workspace, WorkspaceId, WorkspaceInvite,
};

#[async_trait::async_trait]
pub trait UserStore {
    async fn add_user(&mut self, user: User) -> Result<(), UserStoreError>;
    async fn get_user(
        &self,
        workspace_id: &WorkspaceId,
        user_id: &UserId,
    ) -> Result<User, UserStoreError>;
    async fn get_user_by_email(
        &self,
        email: &Email,
    ) -> Result<User, UserStoreError>;
    async fn validate_user(
        &self,
        email: &Email,
        password: &Password,
    ) -> Result<(), UserStoreError>;
    async fn list_users(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<User>, UserStoreError>;
    async fn update_user(&mut self, user: &User) -> Result<(), UserStoreError>;
    async fn count_active_users(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, UserStoreError>;
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User already exists")]
    UserAlreadyExists,
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for UserStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::UserAlreadyExists, Self::UserAlreadyExists)
                | (Self::UserNotFound, Self::UserNotFound)
                | (Self::InvalidCredentials, Self::InvalidCredentials)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait::async_trait]
pub trait WorkspaceStore {
    async fn add_workspace(
        &mut self,
        workspace: Workspace,
    ) -> Result<(), WorkspaceStoreError>;
    async fn get_workspace(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Workspace, WorkspaceStoreError>;
    async fn get_workspace_by_customer(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Workspace, WorkspaceStoreError>;
    async fn update_workspace(
        &mut self,
        workspace: &Workspace,
    ) -> Result<(), WorkspaceStoreError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, WorkspaceStoreError>;

    async fn add_invite(
        &mut self,
        invite: WorkspaceInvite,
    ) -> Result<(), WorkspaceStoreError>;
    async fn get_invite_by_token(
        &self,
        token: &InviteToken,
    ) -> Result<WorkspaceInvite, WorkspaceStoreError>;
    async fn list_pending_invites(
        &self,
        workspace_id: &WorkspaceId,
        now: DateTime<Utc>,
    ) -> Result<Vec<WorkspaceInvite>, WorkspaceStoreError>;
    async fn mark_invite_accepted(
        &mut self,
        invite_id: &InviteId,
        accepted_at: DateTime<Utc>,
    ) -> Result<(), WorkspaceStoreError>;
    async fn delete_invite(
        &mut self,
        workspace_id: &WorkspaceId,
        invite_id: &InviteId,
    ) -> Result<(), WorkspaceStoreError>;
}

#[derive(Debug, Error)]
pub enum WorkspaceStoreError {
    #[error("Workspace not found")]
    WorkspaceNotFound,
    #[error("Workspace slug already taken")]
    SlugTaken,
    #[error("Invite not found")]
    InviteNotFound,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for WorkspaceStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::WorkspaceNotFound, Self::WorkspaceNotFound)
                | (Self::SlugTaken, Self::SlugTaken)
                | (Self::InviteNotFound, Self::InviteNotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

#[async_trait::async_trait]
pub trait TeamStore {
    async fn add_team_member(
        &mut self,
        member: TeamMember,
    ) -> Result<(), TeamStoreError>;
    async fn get_team_member(
        &self,
        workspace_id: &WorkspaceId,
        member_id: &TeamMemberId,
    ) -> Result<TeamMember, TeamStoreError>;
    async fn list_team_members(
        &self,
        workspace_id: &WorkspaceId,
        include_inactive: bool,
    ) -> Result<Vec<TeamMember>, TeamStoreError>;
    async fn update_team_member(
        &mut self,
        member: &TeamMember,
    ) -> Result<(), TeamStoreError>;
    async fn count_active_team_members(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, TeamStoreError>;

    async fn add_skill(&mut self, skill: Skill) -> Result<(), TeamStoreError>;
    async fn list_skills(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<Vec<Skill>, TeamStoreError>;
    /// Removes the skill and detaches it from every team member.
    async fn delete_skill(
        &mut self,
        workspace_id: &WorkspaceId,
        skill_id: &SkillId,
    ) -> Result<(), TeamStoreError>;
}

#[derive(Debug, Error)]
pub enum TeamStoreError {
    #[error("Team member not found")]
    TeamMemberNotFound,
    #[error("Skill not found")]
    SkillNotFound,
    #[error("Skill already exists")]
    SkillExists,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for TeamStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::TeamMemberNotFound, Self::TeamMemberNotFound)
                | (Self::SkillNotFound, Self::SkillNotFound)
                | (Self::SkillExists, Self::SkillExists)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Narrows an assignment listing. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentFilter {
    pub team_member_id: Option<TeamMemberId>,
    pub project_id: Option<ProjectId>,
    pub window: Option<DateRange>,
}

impl AssignmentFilter {
    pub fn overlapping(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            window: Some(DateRange { start, end }),
            ..Default::default()
        }
    }

    pub fn matches(&self, assignment: &Assignment) -> bool {
        self.team_member_id
            .map_or(true, |id| assignment.team_member_id == id)
            && self.project_id.map_or(true, |id| assignment.project_id == id)
            && self
                .window
                .map_or(true, |window| assignment.dates.overlaps(&window))
    }
}

#[async_trait::async_trait]
pub trait ProjectStore {
    async fn add_project(
        &mut self,
        project: Project,
    ) -> Result<(), ProjectStoreError>;
    async fn get_project(
        &self,
        workspace_id: &WorkspaceId,
        project_id: &ProjectId,
    ) -> Result<Project, ProjectStoreError>;
    async fn list_projects(
        &self,
        workspace_id: &WorkspaceId,
        include_archived: bool,
    ) -> Result<Vec<Project>, ProjectStoreError>;
    async fn update_project(
        &mut self,
        project: &Project,
    ) -> Result<(), ProjectStoreError>;
    async fn count_active_projects(
        &self,
        workspace_id: &WorkspaceId,
    ) -> Result<usize, ProjectStoreError>;

    async fn add_assignment(
        &mut self,
        assignment: Assignment,
    ) -> Result<(), ProjectStoreError>;
    async fn get_assignment(
        &self,
        workspace_id: &WorkspaceId,
        assignment_id: &AssignmentId,
    ) -> Result<Assignment, ProjectStoreError>;
    async fn list_assignments(
        &self,
        workspace_id: &WorkspaceId,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, ProjectStoreError>;
    async fn update_assignment(
        &mut self,
        assignment: &Assignment,
    ) -> Result<(), ProjectStoreError>;
    async fn delete_assignment(
        &mut self,
        workspace_id: &WorkspaceId,
        assignment_id: &AssignmentId,
    ) -> Result<(), ProjectStoreError>;
}

#[derive(Debug, Error)]
pub enum ProjectStoreError {
    #[error("Project not found")]
    ProjectNotFound,
    #[error("Assignment not found")]
    AssignmentNotFound,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for ProjectStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::ProjectNotFound, Self::ProjectNotFound)
                | (Self::AssignmentNotFound, Self::AssignmentNotFound)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}

/// Revoked JWTs. Entries only need to outlive the token itself, so each ban
/// carries the token's `exp` as a unix timestamp.
#[async_trait::async_trait]
pub trait BannedTokenStore {
    async fn ban_token(
        &mut self,
        token: &Secret<String>,
        expires_at: i64,
    ) -> Result<(), BannedTokenStoreError>;
    async fn check_token(
        &self,
        token: &Secret<String>,
    ) -> Result<(), BannedTokenStoreError>;
}

/// Stores never keep the raw token, only its SHA-256 digest.
pub fn token_fingerprint(token: &Secret<String>) -> String {
    hex::encode(Sha256::digest(token.expose_secret().as_bytes()))
}

#[derive(Debug, Error)]
pub enum BannedTokenStoreError {
    #[error("Token is banned")]
    BannedToken,
    #[error("Unexpected error")]
    UnexpectedError(#[source] Report),
}

impl PartialEq for BannedTokenStoreError {
    fn eq(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::BannedToken, Self::BannedToken)
                | (Self::UnexpectedError(_), Self::UnexpectedError(_))
        )
    }
}
