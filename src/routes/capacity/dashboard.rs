use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    app_state::AppState,
    domain::{
        capacity::{team_utilization, OverAllocation},
        project_health::HealthStatus,
        WorkspaceAPIError,
    },
    routes::projects::project_health_rows,
    utils::{auth::get_session_user, workspace::unexpected},
};

use super::{load_capacity_inputs, today, ReportQuery, ReportWindow};

#[tracing::instrument(name = "Dashboard route handler", skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, Json<DashboardSummary>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let query = ReportQuery {
        from: None,
        weeks: Some(1),
    };
    let window = ReportWindow::parse(&query, today())?;
    let inputs = load_capacity_inputs(&state, &user.workspace_id, &window).await?;

    let this_week = team_utilization(
        &inputs.members,
        &inputs.assignments,
        window.from,
        window.weeks,
        &inputs.workspace.thresholds,
    );

    let active_projects = state
        .project_store
        .read()
        .await
        .count_active_projects(&user.workspace_id)
        .await
        .map_err(unexpected)?;

    let health = project_health_rows(&state, &user.workspace_id).await?;
    let count_status = |status: HealthStatus| {
        health.iter().filter(|row| row.health.status == status).count()
    };

    Ok((
        StatusCode::OK,
        Json(DashboardSummary {
            week_start: window.from,
            active_team_members: inputs.members.len(),
            active_projects,
            average_utilization: this_week.average_ratio,
            over_allocated_members: this_week.over_allocations,
            projects_at_risk: count_status(HealthStatus::AtRisk),
            projects_critical: count_status(HealthStatus::Critical),
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub week_start: NaiveDate,
    pub active_team_members: usize,
    pub active_projects: usize,
    pub average_utilization: Option<f64>,
    pub over_allocated_members: Vec<OverAllocation>,
    pub projects_at_risk: usize,
    pub projects_critical: usize,
}
