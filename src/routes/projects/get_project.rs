use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Serialize;

use crate::{
    app_state::AppState,
    domain::{
        project_health::{project_health, ProjectHealth},
        Assignment, AssignmentFilter, Project, ProjectId, WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user,
        workspace::{load_project, unexpected},
    },
};

#[tracing::instrument(name = "Get project route handler", skip_all)]
pub async fn get_project(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(project_id): Path<String>,
) -> Result<(StatusCode, Json<ProjectDetails>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let project_id = ProjectId::parse(&project_id)?;
    let project = load_project(&state, &user.workspace_id, &project_id).await?;

    let filter = AssignmentFilter {
        project_id: Some(project.id),
        ..AssignmentFilter::default()
    };
    let assignments = state
        .project_store
        .read()
        .await
        .list_assignments(&user.workspace_id, &filter)
        .await
        .map_err(unexpected)?;
    let members = state
        .team_store
        .read()
        .await
        .list_team_members(&user.workspace_id, true)
        .await
        .map_err(unexpected)?;

    let health = project_health(
        &project,
        &assignments,
        &members,
        Utc::now().date_naive(),
    );

    Ok((
        StatusCode::OK,
        Json(ProjectDetails {
            project,
            assignments,
            health,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct ProjectDetails {
    pub project: Project,
    pub assignments: Vec<Assignment>,
    pub health: ProjectHealth,
}
