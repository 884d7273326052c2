use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{UserProfile, WorkspaceAPIError},
    utils::{auth::get_session_user, workspace::unexpected},
};

#[tracing::instrument(name = "List users route handler", skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<Vec<UserProfile>>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;

    let users = state
        .user_store
        .read()
        .await
        .list_users(&user.workspace_id)
        .await
        .map_err(unexpected)?;

    Ok((
        StatusCode::OK,
        Json(users.iter().map(UserProfile::from).collect()),
    ))
}
