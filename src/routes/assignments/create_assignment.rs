use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        capacity::OverAllocation, parse_notes, Assignment, DateRange,
        ProjectId, TeamMemberId, User, ValidationError, WeeklyHours,
        WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user,
        workspace::{load_project, load_team_member, load_workspace, unexpected},
    },
};

use super::over_allocation_warnings;

#[tracing::instrument(name = "Create assignment route handler", skip_all)]
pub async fn create_assignment(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<AssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let assignment = request.to_assignment(&state, &user).await?;

    state
        .project_store
        .write()
        .await
        .add_assignment(assignment.clone())
        .await
        .map_err(unexpected)?;

    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let member =
        load_team_member(&state, &user.workspace_id, &assignment.team_member_id)
            .await?;
    let warnings =
        over_allocation_warnings(&state, &workspace, &member, &assignment.dates)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse {
            assignment,
            warnings,
        }),
    ))
}

/// Body of both the create and the update request.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub team_member_id: String,
    pub project_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours_per_week: f64,
    pub billable: Option<bool>,
    pub notes: Option<String>,
}

impl AssignmentRequest {
    /// Validates the request against the workspace. The member and the
    /// project must exist and be active.
    pub async fn to_assignment(
        &self,
        state: &AppState,
        user: &User,
    ) -> Result<Assignment, WorkspaceAPIError> {
        let dates = DateRange::parse_assignment(self.start_date, self.end_date)?;
        let hours = WeeklyHours::allocation(self.hours_per_week)?;
        let notes = parse_notes(self.notes.as_deref())?;

        let member_id = TeamMemberId::parse(&self.team_member_id)?;
        let member = load_team_member(state, &user.workspace_id, &member_id).await?;
        if !member.active {
            return Err(ValidationError::new(String::from(
                "Team member is inactive",
            ))
            .into());
        }

        let project_id = ProjectId::parse(&self.project_id)?;
        let project = load_project(state, &user.workspace_id, &project_id).await?;
        if !project.active {
            return Err(ValidationError::new(String::from(
                "Project is archived",
            ))
            .into());
        }

        let mut assignment =
            Assignment::new(user.workspace_id, member.id, project.id, dates, hours);
        assignment.billable = self.billable.unwrap_or(true);
        assignment.notes = notes;
        Ok(assignment)
    }
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub assignment: Assignment,
    pub warnings: Vec<OverAllocation>,
}
