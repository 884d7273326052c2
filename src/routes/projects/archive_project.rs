use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{Project, ProjectId, UserRole, WorkspaceAPIError},
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_project, unexpected},
    },
};

#[tracing::instrument(name = "Archive project route handler", skip_all)]
pub async fn archive_project(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(project_id): Path<String>,
) -> Result<(StatusCode, Json<Project>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let project_id = ProjectId::parse(&project_id)?;
    let mut project = load_project(&state, &user.workspace_id, &project_id).await?;

    if project.active {
        project.active = false;
        state
            .project_store
            .write()
            .await
            .update_project(&project)
            .await
            .map_err(unexpected)?;
    }

    Ok((StatusCode::OK, Json(project)))
}
