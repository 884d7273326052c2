use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::WorkspaceAPIError,
    utils::{auth::get_session_user, workspace::load_workspace},
};

use super::SessionResponse;

#[tracing::instrument(name = "Current session", skip_all)]
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<SessionResponse>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let workspace = load_workspace(&state, &user.workspace_id).await?;

    Ok((
        StatusCode::OK,
        Json(SessionResponse {
            user: (&user).into(),
            workspace,
        }),
    ))
}
