use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    app_state::AppState,
    domain::{
        CheckoutRequest, Plan, UserRole, ValidationError, WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user, permissions::require_role,
        workspace::load_workspace,
    },
};

#[tracing::instrument(name = "Checkout route handler", skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<RedirectResponse>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Owner)?;

    let plan = request.plan.parse::<Plan>()?;
    let price_id = state
        .settings
        .stripe_prices
        .price_id(plan)
        .ok_or_else(|| {
            ValidationError::new(format!("The {plan} plan cannot be purchased"))
        })?
        .to_owned();

    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let app_url = &state.settings.app_url;
    let checkout = CheckoutRequest {
        workspace_id: workspace.id,
        plan,
        price_id,
        customer_id: workspace.stripe_customer_id.clone(),
        customer_email: user.email.clone(),
        success_url: format!("{app_url}/billing?checkout=success"),
        cancel_url: format!("{app_url}/billing?checkout=canceled"),
    };

    let url = state
        .payment_client
        .create_checkout_session(&checkout)
        .await
        .map_err(WorkspaceAPIError::PaymentProviderError)?;

    Ok((StatusCode::OK, Json(RedirectResponse { url })))
}

#[derive(Deserialize)]
pub struct CheckoutBody {
    pub plan: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RedirectResponse {
    pub url: String,
}
