use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{Skill, TeamStoreError, UserRole, WorkspaceAPIError},
    utils::{
        auth::get_session_user, permissions::require_role,
        workspace::unexpected,
    },
};

#[tracing::instrument(name = "Create skill route handler", skip_all)]
pub async fn create_skill(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<Skill>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let skill = Skill::new(user.workspace_id, Skill::parse_name(&request.name)?);

    state
        .team_store
        .write()
        .await
        .add_skill(skill.clone())
        .await
        .map_err(|e| match e {
            TeamStoreError::SkillExists => WorkspaceAPIError::Conflict(format!(
                "A skill named {} already exists",
                skill.name.as_ref()
            )),
            e => unexpected(e),
        })?;

    Ok((StatusCode::CREATED, Json(skill)))
}

#[derive(Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
}
