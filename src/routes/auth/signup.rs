use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use color_eyre::eyre::eyre;
use rand::{distributions::Alphanumeric, Rng};
use secrecy::Secret;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        AuthAPIError, Email, Name, Password, Slug, User, UserPasswordHash,
        UserProfile, UserRole, UserStoreError, Workspace, WorkspaceStoreError,
        TRIAL_LENGTH_DAYS,
    },
    services::notifications::{send_in_background, WelcomeEmail, WELCOME_SUBJECT},
    utils::auth::generate_auth_cookie,
};

const SLUG_ATTEMPTS: usize = 5;
const SLUG_SUFFIX_LENGTH: usize = 6;

#[tracing::instrument(name = "Signup", skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), AuthAPIError> {
    let workspace_name = Name::parse("Workspace name", &request.workspace_name)?;
    let name = Name::parse("Name", &request.name)?;
    let email = Email::parse(Secret::new(request.email))?;
    let password = Password::parse(request.password)?;

    match state.user_store.read().await.get_user_by_email(&email).await {
        Ok(_) => return Err(AuthAPIError::UserAlreadyExists),
        Err(UserStoreError::UserNotFound) => (),
        Err(e) => return Err(AuthAPIError::UnexpectedError(eyre!(e))),
    }

    let hash = UserPasswordHash::from_password(&password)
        .await
        .map_err(AuthAPIError::UnexpectedError)?;

    let workspace = create_workspace(&state, workspace_name).await?;
    let user = User::new(workspace.id, email, name, hash, UserRole::Owner);

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

    tracing::info!(workspace_id = %workspace.id, "workspace created");

    send_in_background(
        state.email_client.clone(),
        user.email.clone(),
        WELCOME_SUBJECT,
        &WelcomeEmail {
            name: user.name.as_ref(),
            workspace: workspace.name.as_ref(),
            trial_days: TRIAL_LENGTH_DAYS,
            app_url: &state.settings.app_url,
        },
    );

    let auth_cookie = generate_auth_cookie(&user, &state.settings.jwt_secret)
        .map_err(AuthAPIError::UnexpectedError)?;

    let response = Json(SessionResponse {
        user: UserProfile::from(&user),
        workspace,
    });

    Ok((StatusCode::CREATED, jar.add(auth_cookie), response))
}

/// Stores a new workspace under a slug derived from its name, adding a
/// random suffix when the plain slug is taken.
#[tracing::instrument(name = "Creating workspace", skip_all)]
async fn create_workspace(
    state: &AppState,
    name: Name,
) -> Result<Workspace, AuthAPIError> {
    let base = Slug::from_name(&name);
    let mut workspace_store = state.workspace_store.write().await;

    for attempt in 0..SLUG_ATTEMPTS {
        let slug = if attempt == 0 {
            base.clone()
        } else {
            base.with_suffix(&random_suffix())
        };
        let taken = workspace_store
            .slug_exists(slug.as_ref())
            .await
            .map_err(|e| AuthAPIError::UnexpectedError(eyre!(e)))?;
        if taken {
            continue;
        }
        let workspace = Workspace::new(name.clone(), slug, Utc::now());
        match workspace_store.add_workspace(workspace.clone()).await {
            Ok(()) => return Ok(workspace),
            Err(WorkspaceStoreError::SlugTaken) => continue,
            Err(e) => return Err(AuthAPIError::UnexpectedError(eyre!(e))),
        }
    }

    Err(AuthAPIError::UnexpectedError(eyre!(
        "no free slug for workspace {}",
        base.as_ref()
    )))
}

fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SLUG_SUFFIX_LENGTH)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

#[derive(Deserialize)]
pub struct SignupRequest {
    #[serde(rename = "workspaceName")]
    pub workspace_name: String,
    pub name: String,
    pub email: String,
    pub password: Secret<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub workspace: Workspace,
}
