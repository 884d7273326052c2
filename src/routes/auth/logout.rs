use axum::{extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::{cookie, CookieJar};
use color_eyre::eyre::eyre;

use crate::{
    domain::AuthAPIError,
    utils::{
        auth::{get_token, validate_token},
        constants::JWT_COOKIE_NAME,
    },
    AppState,
};

#[tracing::instrument(name = "Logout route handler", skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Result<impl IntoResponse, AuthAPIError>) {
    let token = match get_token(&jar) {
        Ok(token) => token,
        Err(e) => return (jar, Err(e)),
    };

    let claims = match validate_token(
        &token,
        state.banned_token_store.clone(),
        &state.settings.jwt_secret,
    )
    .await
    {
        Ok(claims) => claims,
        Err(_) => return (jar, Err(AuthAPIError::InvalidToken)),
    };

    let expires_at = i64::try_from(claims.exp).unwrap_or(i64::MAX);
    if let Err(err) = state
        .banned_token_store
        .write()
        .await
        .ban_token(&token, expires_at)
        .await
    {
        return (jar, Err(AuthAPIError::UnexpectedError(eyre!(err))));
    }

    let jar = jar.remove(cookie::Cookie::from(JWT_COOKIE_NAME));

    (jar, Ok(StatusCode::OK))
}
