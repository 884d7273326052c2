use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{TeamMember, TeamMemberId, UserRole, WorkspaceAPIError},
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_team_member, parse_skill_ids, unexpected},
    },
};

use super::TeamMemberRequest;

#[tracing::instrument(name = "Update team member route handler", skip_all)]
pub async fn update_team_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(member_id): Path<String>,
    Json(request): Json<TeamMemberRequest>,
) -> Result<(StatusCode, Json<TeamMember>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let member_id = TeamMemberId::parse(&member_id)?;
    let mut member = load_team_member(&state, &user.workspace_id, &member_id).await?;

    let skill_ids =
        parse_skill_ids(&state, &user.workspace_id, &request.skill_ids).await?;
    request.apply_to(&mut member, skill_ids)?;

    state
        .team_store
        .write()
        .await
        .update_team_member(&member)
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::OK, Json(member)))
}
