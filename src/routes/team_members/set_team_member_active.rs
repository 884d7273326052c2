use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::{
    app_state::AppState,
    domain::{
        plan_limits::check_team_member_limit, TeamMember, TeamMemberId,
        UserRole, WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_team_member, load_workspace, unexpected},
    },
};

/// Deactivated members keep their assignment history but free their seat.
#[tracing::instrument(name = "Deactivate team member route handler", skip_all)]
pub async fn deactivate_team_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(member_id): Path<String>,
) -> Result<(StatusCode, Json<TeamMember>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let member_id = TeamMemberId::parse(&member_id)?;
    let mut member = load_team_member(&state, &user.workspace_id, &member_id).await?;

    if member.active {
        member.active = false;
        state
            .team_store
            .write()
            .await
            .update_team_member(&member)
            .await
            .map_err(unexpected)?;
    }

    Ok((StatusCode::OK, Json(member)))
}

#[tracing::instrument(name = "Reactivate team member route handler", skip_all)]
pub async fn reactivate_team_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(member_id): Path<String>,
) -> Result<(StatusCode, Json<TeamMember>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let member_id = TeamMemberId::parse(&member_id)?;
    let mut member = load_team_member(&state, &user.workspace_id, &member_id).await?;

    if !member.active {
        let workspace = load_workspace(&state, &user.workspace_id).await?;
        let mut team_store = state.team_store.write().await;
        let active_members = team_store
            .count_active_team_members(&user.workspace_id)
            .await
            .map_err(unexpected)?;
        check_team_member_limit(
            workspace.effective_plan(Utc::now()),
            active_members,
            1,
        )?;

        member.active = true;
        team_store
            .update_team_member(&member)
            .await
            .map_err(unexpected)?;
    }

    Ok((StatusCode::OK, Json(member)))
}
