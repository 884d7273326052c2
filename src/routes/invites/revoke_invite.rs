use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{InviteId, UserRole, WorkspaceAPIError, WorkspaceStoreError},
    utils::{
        auth::get_session_user, permissions::require_role,
        workspace::unexpected,
    },
};

#[tracing::instrument(name = "Revoke invite route handler", skip_all)]
pub async fn revoke_invite(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(invite_id): Path<String>,
) -> Result<StatusCode, WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let invite_id = InviteId::parse(&invite_id)?;
    state
        .workspace_store
        .write()
        .await
        .delete_invite(&user.workspace_id, &invite_id)
        .await
        .map_err(|e| match e {
            WorkspaceStoreError::InviteNotFound => {
                WorkspaceAPIError::IDNotFoundError(*invite_id.as_ref())
            }
            e => unexpected(e),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
