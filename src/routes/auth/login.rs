use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use color_eyre::eyre::eyre;
use secrecy::Secret;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{AuthAPIError, Email, Password, UserStoreError},
    utils::{auth::generate_auth_cookie, workspace::load_workspace},
};

use super::SessionResponse;

#[tracing::instrument(name = "Login", skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> (
    CookieJar,
    Result<(StatusCode, Json<SessionResponse>), AuthAPIError>,
) {
    let email = match Email::parse(Secret::new(request.email)) {
        Ok(email) => email,
        Err(e) => return (jar, Err(AuthAPIError::ValidationError(e))),
    };

    let password = match Password::parse(request.password) {
        Ok(password) => password,
        Err(_) => return (jar, Err(AuthAPIError::IncorrectCredentials)),
    };

    let user = {
        let user_store = state.user_store.read().await;

        match user_store.validate_user(&email, &password).await {
            Ok(()) => (),
            Err(UserStoreError::InvalidCredentials)
            | Err(UserStoreError::UserNotFound) => {
                return (jar, Err(AuthAPIError::IncorrectCredentials))
            }
            Err(err) => {
                return (jar, Err(AuthAPIError::UnexpectedError(eyre!(err))))
            }
        }

        match user_store.get_user_by_email(&email).await {
            Ok(user) => user,
            Err(_) => return (jar, Err(AuthAPIError::IncorrectCredentials)),
        }
    };

    if !user.active {
        return (jar, Err(AuthAPIError::UserDeactivated));
    }

    let workspace = match load_workspace(&state, &user.workspace_id).await {
        Ok(workspace) => workspace,
        Err(e) => return (jar, Err(AuthAPIError::UnexpectedError(eyre!(e)))),
    };

    let auth_cookie =
        match generate_auth_cookie(&user, &state.settings.jwt_secret) {
            Ok(cookie) => cookie,
            Err(err) => return (jar, Err(AuthAPIError::UnexpectedError(err))),
        };

    let response = Json(SessionResponse {
        user: (&user).into(),
        workspace,
    });

    (jar.add(auth_cookie), Ok((StatusCode::OK, response)))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: Secret<String>,
}
