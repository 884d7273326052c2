use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use chrono::Utc;
use color_eyre::eyre::{eyre, Context, ContextCompat, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    app_state::{AppState, BannedTokenStoreType},
    domain::{
        AuthAPIError, BannedTokenStoreError, User, UserId, UserRole,
        UserStoreError, WorkspaceId,
    },
};

use super::constants::JWT_COOKIE_NAME;

// Create cookie with a new JWT auth token
#[tracing::instrument(name = "Generating auth cookie", skip_all)]
pub fn generate_auth_cookie(
    user: &User,
    jwt_secret: &Secret<String>,
) -> Result<Cookie<'static>> {
    let token = generate_auth_token(user, jwt_secret)?;
    Ok(create_auth_cookie(token))
}

#[tracing::instrument(name = "Creating auth cookie", skip_all)]
fn create_auth_cookie(token: Secret<String>) -> Cookie<'static> {
    Cookie::build((JWT_COOKIE_NAME, token.expose_secret().to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

// 24 hours
pub const TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24;

#[tracing::instrument(name = "Generating auth token", skip_all)]
fn generate_auth_token(
    user: &User,
    jwt_secret: &Secret<String>,
) -> Result<Secret<String>> {
    let delta = chrono::Duration::try_seconds(TOKEN_TTL_SECONDS)
        .wrap_err("Failed to create token lifetime")?;

    let exp = Utc::now()
        .checked_add_signed(delta)
        .ok_or(eyre!("failed to add to current time"))?
        .timestamp();

    let exp: usize = exp.try_into().wrap_err(format!(
        "failed to cast exp time to usize. exp time: {}",
        exp
    ))?;

    let claims = Claims {
        sub: user.id.to_string(),
        workspace: user.workspace_id.to_string(),
        role: user.role,
        exp,
    };

    create_token(&claims, jwt_secret)
}

// Check if JWT auth token is valid by decoding it using the JWT secret
#[tracing::instrument(name = "Validating auth token", skip_all)]
pub async fn validate_token(
    token: &Secret<String>,
    banned_token_store: BannedTokenStoreType,
    jwt_secret: &Secret<String>,
) -> Result<Claims> {
    banned_token_store
        .read()
        .await
        .check_token(token)
        .await
        .map_err(|e| match e {
            BannedTokenStoreError::BannedToken => eyre!("token has been revoked"),
            BannedTokenStoreError::UnexpectedError(report) => {
                report.wrap_err("failed to check banned tokens")
            }
        })?;

    decode::<Claims>(
        token.expose_secret(),
        &DecodingKey::from_secret(jwt_secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .wrap_err("failed to decode token")
}

#[tracing::instrument(name = "Creating auth token", skip_all)]
fn create_token(
    claims: &Claims,
    jwt_secret: &Secret<String>,
) -> Result<Secret<String>> {
    let token_string = encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.expose_secret().as_bytes()),
    )
    .wrap_err("failed to create token")?;

    Ok(Secret::new(token_string))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub workspace: String,
    pub role: UserRole,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Result<UserId, AuthAPIError> {
        UserId::parse(&self.sub).map_err(|_| AuthAPIError::InvalidToken)
    }

    pub fn workspace_id(&self) -> Result<WorkspaceId, AuthAPIError> {
        WorkspaceId::parse(&self.workspace).map_err(|_| AuthAPIError::InvalidToken)
    }
}

pub fn get_token(jar: &CookieJar) -> Result<Secret<String>, AuthAPIError> {
    jar.get(JWT_COOKIE_NAME)
        .map(|cookie| Secret::new(cookie.value().to_owned()))
        .ok_or(AuthAPIError::MissingToken)
}

#[tracing::instrument(name = "Reading claims from cookie", skip_all)]
pub async fn get_claims(
    jar: &CookieJar,
    state: &AppState,
) -> Result<Claims, AuthAPIError> {
    let token = get_token(jar)?;
    validate_token(
        &token,
        state.banned_token_store.clone(),
        &state.settings.jwt_secret,
    )
    .await
    .map_err(|_| AuthAPIError::InvalidToken)
}

/// The signed-in user, loaded fresh so that role changes and deactivation
/// apply to tokens issued earlier.
#[tracing::instrument(name = "Loading session user", skip_all)]
pub async fn get_session_user(
    jar: &CookieJar,
    state: &AppState,
) -> Result<User, AuthAPIError> {
    let claims = get_claims(jar, state).await?;
    let user = state
        .user_store
        .read()
        .await
        .get_user(&claims.workspace_id()?, &claims.user_id()?)
        .await
        .map_err(|e| match e {
            UserStoreError::UserNotFound => AuthAPIError::InvalidToken,
            e => AuthAPIError::UnexpectedError(eyre!(e)),
        })?;

    if !user.active {
        return Err(AuthAPIError::UserDeactivated);
    }
    Ok(user)
}
