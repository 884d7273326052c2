//! Lookups shared by the workspace-scoped handlers. A record that belongs to
//! another workspace is reported exactly like a missing one.

use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;

use crate::{
    app_state::AppState,
    domain::{
        Assignment, AssignmentId, Project, ProjectId, ProjectStoreError,
        SkillId, TeamMember, TeamMemberId, TeamStoreError, User, UserId,
        UserStoreError, ValidationError, Workspace, WorkspaceAPIError,
        WorkspaceId, WorkspaceStoreError,
    },
};

pub async fn load_workspace(
    state: &AppState,
    workspace_id: &WorkspaceId,
) -> Result<Workspace, WorkspaceAPIError> {
    state
        .workspace_store
        .read()
        .await
        .get_workspace(workspace_id)
        .await
        .map_err(|e| match e {
            WorkspaceStoreError::WorkspaceNotFound => {
                WorkspaceAPIError::IDNotFoundError(*workspace_id.as_ref())
            }
            e => WorkspaceAPIError::UnexpectedError(eyre!(e)),
        })
}

pub async fn load_user(
    state: &AppState,
    workspace_id: &WorkspaceId,
    user_id: &UserId,
) -> Result<User, WorkspaceAPIError> {
    state
        .user_store
        .read()
        .await
        .get_user(workspace_id, user_id)
        .await
        .map_err(|e| match e {
            UserStoreError::UserNotFound => {
                WorkspaceAPIError::IDNotFoundError(*user_id.as_ref())
            }
            e => WorkspaceAPIError::UnexpectedError(eyre!(e)),
        })
}

pub async fn load_team_member(
    state: &AppState,
    workspace_id: &WorkspaceId,
    member_id: &TeamMemberId,
) -> Result<TeamMember, WorkspaceAPIError> {
    state
        .team_store
        .read()
        .await
        .get_team_member(workspace_id, member_id)
        .await
        .map_err(|e| match e {
            TeamStoreError::TeamMemberNotFound => {
                WorkspaceAPIError::IDNotFoundError(*member_id.as_ref())
            }
            e => WorkspaceAPIError::UnexpectedError(eyre!(e)),
        })
}

pub async fn load_project(
    state: &AppState,
    workspace_id: &WorkspaceId,
    project_id: &ProjectId,
) -> Result<Project, WorkspaceAPIError> {
    state
        .project_store
        .read()
        .await
        .get_project(workspace_id, project_id)
        .await
        .map_err(|e| match e {
            ProjectStoreError::ProjectNotFound => {
                WorkspaceAPIError::IDNotFoundError(*project_id.as_ref())
            }
            e => WorkspaceAPIError::UnexpectedError(eyre!(e)),
        })
}

pub async fn load_assignment(
    state: &AppState,
    workspace_id: &WorkspaceId,
    assignment_id: &AssignmentId,
) -> Result<Assignment, WorkspaceAPIError> {
    state
        .project_store
        .read()
        .await
        .get_assignment(workspace_id, assignment_id)
        .await
        .map_err(|e| match e {
            ProjectStoreError::AssignmentNotFound => {
                WorkspaceAPIError::IDNotFoundError(*assignment_id.as_ref())
            }
            e => WorkspaceAPIError::UnexpectedError(eyre!(e)),
        })
}

/// Parses skill ids from a request, dropping duplicates. Every id must name
/// a skill of the workspace.
pub async fn parse_skill_ids(
    state: &AppState,
    workspace_id: &WorkspaceId,
    ids: &[String],
) -> Result<Vec<SkillId>, WorkspaceAPIError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let skills = state
        .team_store
        .read()
        .await
        .list_skills(workspace_id)
        .await
        .map_err(unexpected)?;

    let mut skill_ids: Vec<SkillId> = Vec::with_capacity(ids.len());
    for id in ids {
        let skill_id = SkillId::parse(id)?;
        if !skills.iter().any(|skill| skill.id == skill_id) {
            return Err(ValidationError::new(format!("Unknown skill: {id}")).into());
        }
        if !skill_ids.contains(&skill_id) {
            skill_ids.push(skill_id);
        }
    }
    Ok(skill_ids)
}

/// Active users and pending invites, which together occupy user seats.
pub async fn user_seats(
    state: &AppState,
    workspace_id: &WorkspaceId,
    now: DateTime<Utc>,
) -> Result<(usize, usize), WorkspaceAPIError> {
    let active_users = state
        .user_store
        .read()
        .await
        .count_active_users(workspace_id)
        .await
        .map_err(unexpected)?;
    let pending_invites = state
        .workspace_store
        .read()
        .await
        .list_pending_invites(workspace_id, now)
        .await
        .map_err(unexpected)?
        .len();
    Ok((active_users, pending_invites))
}

pub fn unexpected(e: impl std::error::Error + Send + Sync + 'static) -> WorkspaceAPIError {
    WorkspaceAPIError::UnexpectedError(eyre!(e))
}
