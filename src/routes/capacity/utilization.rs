use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{
        capacity::{team_utilization, TeamUtilizationReport},
        WorkspaceAPIError,
    },
    utils::auth::get_session_user,
};

use super::{load_capacity_inputs, today, ReportQuery, ReportWindow};

#[tracing::instrument(name = "Utilization report route handler", skip_all)]
pub async fn utilization_report(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ReportQuery>,
) -> Result<(StatusCode, Json<TeamUtilizationReport>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let window = ReportWindow::parse(&query, today())?;
    let inputs = load_capacity_inputs(&state, &user.workspace_id, &window).await?;

    let report = team_utilization(
        &inputs.members,
        &inputs.assignments,
        window.from,
        window.weeks,
        &inputs.workspace.thresholds,
    );

    Ok((StatusCode::OK, Json(report)))
}
