use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Serialize;

use crate::{
    app_state::AppState,
    domain::{
        project_health::{project_health, ProjectHealth},
        AssignmentFilter, Name, ProjectId, WorkspaceAPIError, WorkspaceId,
    },
    utils::{auth::get_session_user, workspace::unexpected},
};

#[tracing::instrument(name = "List project health route handler", skip_all)]
pub async fn list_project_health(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<Vec<ProjectHealthRow>>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let rows = project_health_rows(&state, &user.workspace_id).await?;

    Ok((StatusCode::OK, Json(rows)))
}

/// Health of every project that is not archived.
pub async fn project_health_rows(
    state: &AppState,
    workspace_id: &WorkspaceId,
) -> Result<Vec<ProjectHealthRow>, WorkspaceAPIError> {
    let (projects, assignments) = {
        let project_store = state.project_store.read().await;
        let projects = project_store
            .list_projects(workspace_id, false)
            .await
            .map_err(unexpected)?;
        let assignments = project_store
            .list_assignments(workspace_id, &AssignmentFilter::default())
            .await
            .map_err(unexpected)?;
        (projects, assignments)
    };
    let members = state
        .team_store
        .read()
        .await
        .list_team_members(workspace_id, true)
        .await
        .map_err(unexpected)?;

    let today = Utc::now().date_naive();
    Ok(projects
        .iter()
        .map(|project| ProjectHealthRow {
            project_id: project.id,
            name: project.name.clone(),
            health: project_health(project, &assignments, &members, today),
        })
        .collect())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHealthRow {
    pub project_id: ProjectId,
    pub name: Name,
    pub health: ProjectHealth,
}
