use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{UserRole, ValidationError, WorkspaceAPIError},
    utils::{
        auth::get_session_user, permissions::require_role,
        workspace::load_workspace,
    },
};

use super::RedirectResponse;

#[tracing::instrument(name = "Billing portal route handler", skip_all)]
pub async fn portal(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<RedirectResponse>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Owner)?;

    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let customer_id = workspace.stripe_customer_id.ok_or_else(|| {
        ValidationError::new(String::from(
            "The workspace has no billing account yet",
        ))
    })?;

    let url = state
        .payment_client
        .create_portal_session(
            &customer_id,
            &format!("{}/billing", state.settings.app_url),
        )
        .await
        .map_err(WorkspaceAPIError::PaymentProviderError)?;

    Ok((StatusCode::OK, Json(RedirectResponse { url })))
}
