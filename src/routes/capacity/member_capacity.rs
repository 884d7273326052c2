use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::{
    app_state::AppState,
    domain::{
        capacity::{member_utilization, MemberUtilization},
        Assignment, AssignmentFilter, TeamMemberId, WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user,
        workspace::{load_team_member, load_workspace, unexpected},
    },
};

use super::{today, ReportQuery, ReportWindow};

#[tracing::instrument(name = "Member capacity route handler", skip_all)]
pub async fn member_capacity(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(member_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<(StatusCode, Json<MemberCapacity>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let window = ReportWindow::parse(&query, today())?;

    let member_id = TeamMemberId::parse(&member_id)?;
    let member = load_team_member(&state, &user.workspace_id, &member_id).await?;
    let workspace = load_workspace(&state, &user.workspace_id).await?;

    let range = window.date_range();
    let mut filter = AssignmentFilter::overlapping(range.start, range.end);
    filter.team_member_id = Some(member.id);
    let assignments = state
        .project_store
        .read()
        .await
        .list_assignments(&user.workspace_id, &filter)
        .await
        .map_err(unexpected)?;

    let utilization = member_utilization(
        &member,
        &assignments,
        window.from,
        window.weeks,
        &workspace.thresholds,
    );

    Ok((
        StatusCode::OK,
        Json(MemberCapacity {
            utilization,
            assignments,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct MemberCapacity {
    pub utilization: MemberUtilization,
    pub assignments: Vec<Assignment>,
}
