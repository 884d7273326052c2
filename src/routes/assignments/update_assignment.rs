use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{AssignmentId, WorkspaceAPIError},
    utils::{
        auth::get_session_user,
        workspace::{load_assignment, load_team_member, load_workspace, unexpected},
    },
};

use super::{over_allocation_warnings, AssignmentRequest, AssignmentResponse};

#[tracing::instrument(name = "Update assignment route handler", skip_all)]
pub async fn update_assignment(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(assignment_id): Path<String>,
    Json(request): Json<AssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentResponse>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let assignment_id = AssignmentId::parse(&assignment_id)?;
    let existing = load_assignment(&state, &user.workspace_id, &assignment_id).await?;

    let mut assignment = request.to_assignment(&state, &user).await?;
    assignment.id = existing.id;

    state
        .project_store
        .write()
        .await
        .update_assignment(&assignment)
        .await
        .map_err(unexpected)?;

    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let member =
        load_team_member(&state, &user.workspace_id, &assignment.team_member_id)
            .await?;
    let warnings =
        over_allocation_warnings(&state, &workspace, &member, &assignment.dates)
            .await?;

    Ok((
        StatusCode::OK,
        Json(AssignmentResponse {
            assignment,
            warnings,
        }),
    ))
}
