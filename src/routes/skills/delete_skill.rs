use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{SkillId, TeamStoreError, UserRole, WorkspaceAPIError},
    utils::{
        auth::get_session_user, permissions::require_role,
        workspace::unexpected,
    },
};

/// Deleting a skill also removes it from team members and from the
/// requirements of every project.
#[tracing::instrument(name = "Delete skill route handler", skip_all)]
pub async fn delete_skill(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(skill_id): Path<String>,
) -> Result<StatusCode, WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let skill_id = SkillId::parse(&skill_id)?;
    state
        .team_store
        .write()
        .await
        .delete_skill(&user.workspace_id, &skill_id)
        .await
        .map_err(|e| match e {
            TeamStoreError::SkillNotFound => {
                WorkspaceAPIError::IDNotFoundError(*skill_id.as_ref())
            }
            e => unexpected(e),
        })?;

    let mut project_store = state.project_store.write().await;
    let projects = project_store
        .list_projects(&user.workspace_id, true)
        .await
        .map_err(unexpected)?;
    for mut project in projects {
        if !project.required_skill_ids.contains(&skill_id) {
            continue;
        }
        project.required_skill_ids.retain(|id| id != &skill_id);
        project_store
            .update_project(&project)
            .await
            .map_err(unexpected)?;
    }

    Ok(StatusCode::NO_CONTENT)
}
