use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{Project, WorkspaceAPIError},
    utils::{auth::get_session_user, workspace::unexpected},
};

#[derive(Deserialize)]
pub struct ListProjectsQuery {
    #[serde(rename = "includeArchived", default)]
    pub include_archived: bool,
}

#[tracing::instrument(name = "List projects route handler", skip_all)]
pub async fn list_projects(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListProjectsQuery>,
) -> Result<(StatusCode, Json<Vec<Project>>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;

    let projects = state
        .project_store
        .read()
        .await
        .list_projects(&user.workspace_id, query.include_archived)
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::OK, Json(projects)))
}
