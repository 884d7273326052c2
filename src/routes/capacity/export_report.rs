use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{
        capacity::team_utilization,
        plan_limits::{check_feature, PlanFeature},
        WorkspaceAPIError,
    },
    services::reports::utilization_csv,
    utils::auth::get_session_user,
};

use super::{load_capacity_inputs, today, ReportQuery, ReportWindow};

#[tracing::instrument(name = "Export utilization report route handler", skip_all)]
pub async fn export_utilization_report(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let window = ReportWindow::parse(&query, today())?;
    let inputs = load_capacity_inputs(&state, &user.workspace_id, &window).await?;

    check_feature(
        inputs.workspace.effective_plan(chrono::Utc::now()),
        PlanFeature::ReportExport,
    )?;

    let report = team_utilization(
        &inputs.members,
        &inputs.assignments,
        window.from,
        window.weeks,
        &inputs.workspace.thresholds,
    );
    let body =
        utilization_csv(&report).map_err(WorkspaceAPIError::UnexpectedError)?;
    let disposition = format!(
        "attachment; filename=\"utilization-{}.csv\"",
        window.from.format("%Y-%m-%d")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
