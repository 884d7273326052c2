use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{Workspace, WorkspaceAPIError},
    utils::{auth::get_session_user, workspace::load_workspace},
};

#[tracing::instrument(name = "Get workspace route handler", skip_all)]
pub async fn get_workspace(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<Workspace>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let workspace = load_workspace(&state, &user.workspace_id).await?;

    Ok((StatusCode::OK, Json(workspace)))
}
