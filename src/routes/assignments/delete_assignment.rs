use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;

use crate::{
    app_state::AppState,
    domain::{AssignmentId, ProjectStoreError, WorkspaceAPIError},
    utils::{auth::get_session_user, workspace::unexpected},
};

#[tracing::instrument(name = "Delete assignment route handler", skip_all)]
pub async fn delete_assignment(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(assignment_id): Path<String>,
) -> Result<StatusCode, WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let assignment_id = AssignmentId::parse(&assignment_id)?;

    state
        .project_store
        .write()
        .await
        .delete_assignment(&user.workspace_id, &assignment_id)
        .await
        .map_err(|e| match e {
            ProjectStoreError::AssignmentNotFound => {
                WorkspaceAPIError::IDNotFoundError(*assignment_id.as_ref())
            }
            e => unexpected(e),
        })?;

    Ok(StatusCode::NO_CONTENT)
}
