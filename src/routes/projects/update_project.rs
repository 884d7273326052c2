use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::{
    app_state::AppState,
    domain::{
        plan_limits::check_project_limit, Project, ProjectId, UserRole,
        WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_project, load_workspace, parse_skill_ids, unexpected},
    },
};

use super::ProjectRequest;

#[tracing::instrument(name = "Update project route handler", skip_all)]
pub async fn update_project(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(project_id): Path<String>,
    Json(request): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<Project>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let project_id = ProjectId::parse(&project_id)?;
    let mut project = load_project(&state, &user.workspace_id, &project_id).await?;
    let counted_before = project.counts_toward_limit();

    let skill_ids = parse_skill_ids(
        &state,
        &user.workspace_id,
        &request.required_skill_ids,
    )
    .await?;
    request.apply_to(&mut project, skill_ids)?;

    let mut project_store = state.project_store.write().await;
    // Reopening a closed project takes an active project slot again.
    if !counted_before && project.counts_toward_limit() {
        let workspace = load_workspace(&state, &user.workspace_id).await?;
        let active_projects = project_store
            .count_active_projects(&user.workspace_id)
            .await
            .map_err(unexpected)?;
        check_project_limit(workspace.effective_plan(Utc::now()), active_projects)?;
    }

    project_store
        .update_project(&project)
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::OK, Json(project)))
}
