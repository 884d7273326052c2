use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    app_state::AppState,
    domain::{
        plan_limits::{usage, PlanUsage},
        BillingStatus, Plan, PlanLimits, UserRole, WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_workspace, unexpected, user_seats},
    },
};

#[tracing::instrument(name = "Billing summary route handler", skip_all)]
pub async fn billing_summary(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<BillingSummary>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let now = Utc::now();
    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let effective_plan = workspace.effective_plan(now);

    let team_members = state
        .team_store
        .read()
        .await
        .count_active_team_members(&workspace.id)
        .await
        .map_err(unexpected)?;
    let (active_users, pending_invites) =
        user_seats(&state, &workspace.id, now).await?;
    let active_projects = state
        .project_store
        .read()
        .await
        .count_active_projects(&workspace.id)
        .await
        .map_err(unexpected)?;

    Ok((
        StatusCode::OK,
        Json(BillingSummary {
            plan: workspace.plan,
            effective_plan,
            billing_status: workspace.billing_status,
            trial_ends_at: workspace.trial_ends_at,
            has_billing_account: workspace.stripe_customer_id.is_some(),
            limits: effective_plan.limits(),
            usage: usage(
                effective_plan,
                team_members,
                active_users + pending_invites,
                active_projects,
            ),
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    pub plan: Plan,
    pub effective_plan: Plan,
    pub billing_status: BillingStatus,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub has_billing_account: bool,
    pub limits: PlanLimits,
    pub usage: PlanUsage,
}
