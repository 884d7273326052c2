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
        plan_limits::check_user_limit, UserId, UserProfile, UserRole,
        WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_user, load_workspace, unexpected, user_seats},
    },
};

#[tracing::instrument(name = "Deactivate user route handler", skip_all)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<UserProfile>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let user_id = UserId::parse(&user_id)?;
    if user_id == user.id {
        return Err(WorkspaceAPIError::Forbidden(String::from(
            "You cannot deactivate yourself",
        )));
    }

    let mut target = load_user(&state, &user.workspace_id, &user_id).await?;
    if target.role == UserRole::Owner {
        return Err(WorkspaceAPIError::Forbidden(String::from(
            "Owners cannot be deactivated",
        )));
    }

    if target.active {
        target.active = false;
        state
            .user_store
            .write()
            .await
            .update_user(&target)
            .await
            .map_err(unexpected)?;
    }

    Ok((StatusCode::OK, Json(UserProfile::from(&target))))
}

#[tracing::instrument(name = "Reactivate user route handler", skip_all)]
pub async fn reactivate_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(user_id): Path<String>,
) -> Result<(StatusCode, Json<UserProfile>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let user_id = UserId::parse(&user_id)?;
    let mut target = load_user(&state, &user.workspace_id, &user_id).await?;

    if !target.active {
        let now = Utc::now();
        let workspace = load_workspace(&state, &user.workspace_id).await?;
        let (active_users, pending_invites) =
            user_seats(&state, &user.workspace_id, now).await?;
        check_user_limit(
            workspace.effective_plan(now),
            active_users,
            pending_invites,
        )?;

        target.active = true;
        state
            .user_store
            .write()
            .await
            .update_user(&target)
            .await
            .map_err(unexpected)?;
    }

    Ok((StatusCode::OK, Json(UserProfile::from(&target))))
}
