use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{
        capacity::{find_over_allocations, OverAllocation},
        WorkspaceAPIError,
    },
    utils::auth::get_session_user,
};

use super::{load_capacity_inputs, today, ReportQuery, ReportWindow};

#[tracing::instrument(name = "Over-allocations route handler", skip_all)]
pub async fn over_allocations(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ReportQuery>,
) -> Result<(StatusCode, Json<Vec<OverAllocation>>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let window = ReportWindow::parse(&query, today())?;
    let inputs = load_capacity_inputs(&state, &user.workspace_id, &window).await?;

    let over_allocations = find_over_allocations(
        &inputs.members,
        &inputs.assignments,
        window.from,
        window.weeks,
        &inputs.workspace.thresholds,
    );

    Ok((StatusCode::OK, Json(over_allocations)))
}
