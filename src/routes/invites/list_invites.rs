use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::{
    app_state::AppState,
    domain::{UserRole, WorkspaceAPIError, WorkspaceInvite},
    utils::{
        auth::get_session_user, permissions::require_role,
        workspace::unexpected,
    },
};

#[tracing::instrument(name = "List invites route handler", skip_all)]
pub async fn list_invites(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<Vec<WorkspaceInvite>>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let invites = state
        .workspace_store
        .read()
        .await
        .list_pending_invites(&user.workspace_id, Utc::now())
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::OK, Json(invites)))
}
