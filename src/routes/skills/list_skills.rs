use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{Skill, WorkspaceAPIError},
    utils::{auth::get_session_user, workspace::unexpected},
};

#[tracing::instrument(name = "List skills route handler", skip_all)]
pub async fn list_skills(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<Vec<Skill>>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;

    let skills = state
        .team_store
        .read()
        .await
        .list_skills(&user.workspace_id)
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::OK, Json(skills)))
}
