use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{TeamMember, TeamMemberId, WorkspaceAPIError},
    utils::{auth::get_session_user, workspace::load_team_member},
};

#[tracing::instrument(name = "Get team member route handler", skip_all)]
pub async fn get_team_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(member_id): Path<String>,
) -> Result<(StatusCode, Json<TeamMember>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let member_id = TeamMemberId::parse(&member_id)?;
    let member = load_team_member(&state, &user.workspace_id, &member_id).await?;

    Ok((StatusCode::OK, Json(member)))
}
