use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{
        plan_limits::check_user_limit, Email, UserRole, UserStoreError,
        WorkspaceAPIError, WorkspaceInvite,
    },
    services::notifications::{send_in_background, InviteEmail, INVITE_SUBJECT},
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_workspace, unexpected, user_seats},
    },
};

#[tracing::instrument(name = "Create invite route handler", skip_all)]
pub async fn create_invite(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<CreateInviteRequest>,
) -> Result<(StatusCode, Json<WorkspaceInvite>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let email = Email::parse(Secret::new(request.email))?;
    let role = request.role.parse::<UserRole>()?;
    let now = Utc::now();

    match state.user_store.read().await.get_user_by_email(&email).await {
        Ok(existing) if existing.workspace_id == user.workspace_id => {
            return Err(WorkspaceAPIError::Conflict(String::from(
                "This email already belongs to a user of the workspace",
            )))
        }
        Ok(_) => {
            return Err(WorkspaceAPIError::Conflict(String::from(
                "This email is already registered",
            )))
        }
        Err(UserStoreError::UserNotFound) => (),
        Err(e) => return Err(unexpected(e)),
    }

    let pending = state
        .workspace_store
        .read()
        .await
        .list_pending_invites(&user.workspace_id, now)
        .await
        .map_err(unexpected)?;
    if pending.iter().any(|invite| invite.email == email) {
        return Err(WorkspaceAPIError::Conflict(String::from(
            "This email already has a pending invite",
        )));
    }

    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let (active_users, pending_invites) =
        user_seats(&state, &user.workspace_id, now).await?;
    check_user_limit(workspace.effective_plan(now), active_users, pending_invites)?;

    let invite = WorkspaceInvite::new(workspace.id, email, role, user.id, now)?;
    state
        .workspace_store
        .write()
        .await
        .add_invite(invite.clone())
        .await
        .map_err(unexpected)?;

    let accept_url = format!(
        "{}/invites/accept?token={}",
        state.settings.app_url,
        invite.token.as_ref().expose_secret()
    );
    send_in_background(
        state.email_client.clone(),
        invite.email.clone(),
        INVITE_SUBJECT,
        &InviteEmail {
            inviter: user.name.as_ref(),
            workspace: workspace.name.as_ref(),
            role: invite.role.as_str(),
            accept_url: &accept_url,
            expires_on: invite.expires_at.format("%Y-%m-%d").to_string(),
        },
    );

    Ok((StatusCode::CREATED, Json(invite)))
}

#[derive(Deserialize)]
pub struct CreateInviteRequest {
    pub email: String,
    pub role: String,
}
