use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{UserId, UserProfile, UserRole, WorkspaceAPIError},
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_user, unexpected},
    },
};

#[tracing::instrument(name = "Change user role route handler", skip_all)]
pub async fn change_role(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(user_id): Path<String>,
    Json(request): Json<ChangeRoleRequest>,
) -> Result<(StatusCode, Json<UserProfile>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Owner)?;

    let user_id = UserId::parse(&user_id)?;
    let role = request.role.parse::<UserRole>()?;
    if role == UserRole::Owner {
        return Err(WorkspaceAPIError::Forbidden(String::from(
            "Users cannot be promoted to owner",
        )));
    }

    let mut target = load_user(&state, &user.workspace_id, &user_id).await?;

    let mut user_store = state.user_store.write().await;
    if target.role == UserRole::Owner {
        let active_owners = user_store
            .list_users(&user.workspace_id)
            .await
            .map_err(unexpected)?
            .iter()
            .filter(|u| u.active && u.role == UserRole::Owner)
            .count();
        if active_owners <= 1 {
            return Err(WorkspaceAPIError::Conflict(String::from(
                "The last owner cannot be demoted",
            )));
        }
    }

    target.role = role;
    user_store.update_user(&target).await.map_err(unexpected)?;

    tracing::info!(user_id = %target.id, role = %role, "user role changed");

    Ok((StatusCode::OK, Json(UserProfile::from(&target))))
}

#[derive(Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}
