use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{TeamMember, WorkspaceAPIError},
    utils::{auth::get_session_user, workspace::unexpected},
};

#[derive(Deserialize)]
pub struct ListTeamMembersQuery {
    #[serde(rename = "includeInactive", default)]
    pub include_inactive: bool,
}

#[tracing::instrument(name = "List team members route handler", skip_all)]
pub async fn list_team_members(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListTeamMembersQuery>,
) -> Result<(StatusCode, Json<Vec<TeamMember>>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;

    let members = state
        .team_store
        .read()
        .await
        .list_team_members(&user.workspace_id, query.include_inactive)
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::OK, Json(members)))
}
