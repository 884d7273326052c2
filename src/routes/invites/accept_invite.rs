use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        plan_limits::check_user_limit, AuthAPIError, Email, InviteState,
        InviteToken, Name, Password, User, UserPasswordHash, UserRole,
        UserStoreError, WorkspaceInvite, WorkspaceStoreError,
    },
    routes::auth::SessionResponse,
    utils::{
        auth::generate_auth_cookie,
        workspace::{load_workspace, user_seats},
    },
};

/// Looks up an invite that can still be accepted.
#[tracing::instrument(name = "Finding open invite", skip_all)]
async fn find_open_invite(
    state: &AppState,
    token: Secret<String>,
    now: DateTime<Utc>,
) -> Result<WorkspaceInvite, AuthAPIError> {
    let token =
        InviteToken::parse(token).map_err(|_| AuthAPIError::InvalidInvite)?;

    let invite = state
        .workspace_store
        .read()
        .await
        .get_invite_by_token(&token)
        .await
        .map_err(|e| match e {
            WorkspaceStoreError::InviteNotFound => AuthAPIError::InvalidInvite,
            e => AuthAPIError::UnexpectedError(eyre!(e)),
        })?;

    match invite.state(now) {
        InviteState::Pending => Ok(invite),
        InviteState::Accepted => Err(AuthAPIError::InvalidInvite),
        InviteState::Expired => Err(AuthAPIError::InviteExpired),
    }
}

#[tracing::instrument(name = "Get invite route handler", skip_all)]
pub async fn get_invite(
    State(state): State<AppState>,
    Query(query): Query<InviteQuery>,
) -> Result<(StatusCode, Json<InviteDetails>), AuthAPIError> {
    let invite = find_open_invite(&state, query.token, Utc::now()).await?;
    let workspace = load_workspace(&state, &invite.workspace_id)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    Ok((
        StatusCode::OK,
        Json(InviteDetails {
            email: invite.email,
            role: invite.role,
            workspace_name: workspace.name,
            expires_at: invite.expires_at,
        }),
    ))
}

#[tracing::instrument(name = "Accept invite route handler", skip_all)]
pub async fn accept_invite(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<AcceptInviteRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), AuthAPIError> {
    let name = Name::parse("Name", &request.name)?;
    let password = Password::parse(request.password)?;
    let now = Utc::now();

    let invite = find_open_invite(&state, request.token, now).await?;
    let workspace = load_workspace(&state, &invite.workspace_id)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    // The invite already holds one of the counted seats.
    let (active_users, pending_invites) =
        user_seats(&state, &workspace.id, now)
            .await
            .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;
    check_user_limit(
        workspace.effective_plan(now),
        active_users,
        pending_invites.saturating_sub(1),
    )?;

    let hash = UserPasswordHash::from_password(&password)
        .await
        .map_err(AuthAPIError::UnexpectedError)?;
    let user = User::new(
        workspace.id,
        invite.email.clone(),
        name,
        hash,
        invite.role,
    );

    state
        .user_store
        .write()
        .await
        .add_user(user.clone())
        .await
        .map_err(|e| match e {
            UserStoreError::UserAlreadyExists => AuthAPIError::UserAlreadyExists,
            e => AuthAPIError::UnexpectedError(eyre!(e)),
        })?;

    state
        .workspace_store
        .write()
        .await
        .mark_invite_accepted(&invite.id, now)
        .await
        .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;

    tracing::info!(user_id = %user.id, "invite accepted");

    let auth_cookie = generate_auth_cookie(&user, &state.settings.jwt_secret)
        .map_err(AuthAPIError::UnexpectedError)?;

    let response = Json(SessionResponse {
        user: (&user).into(),
        workspace,
    });

    Ok((StatusCode::CREATED, jar.add(auth_cookie), response))
}

#[derive(Deserialize)]
pub struct InviteQuery {
    pub token: Secret<String>,
}

#[derive(Deserialize)]
pub struct AcceptInviteRequest {
    pub token: Secret<String>,
    pub name: String,
    pub password: Secret<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteDetails {
    pub email: Email,
    pub role: UserRole,
    pub workspace_name: Name,
    pub expires_at: DateTime<Utc>,
}
