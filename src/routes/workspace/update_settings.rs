use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use color_eyre::eyre::eyre;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{
        Name, UserRole, UtilizationThresholds, Workspace, WorkspaceAPIError,
        WorkspaceStoreError,
    },
    utils::{
        auth::get_session_user, permissions::require_role,
        workspace::load_workspace,
    },
};

#[tracing::instrument(name = "Update workspace settings route handler", skip_all)]
pub async fn update_settings(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<(StatusCode, Json<Workspace>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let mut workspace = load_workspace(&state, &user.workspace_id).await?;

    if let Some(name) = request.name {
        workspace.name = Name::parse("Workspace name", &name)?;
    }
    workspace.thresholds = UtilizationThresholds::parse(
        request
            .over_allocation_threshold
            .unwrap_or(workspace.thresholds.over_allocation),
        request
            .under_utilization_threshold
            .unwrap_or(workspace.thresholds.under_utilization),
    )?;

    state
        .workspace_store
        .write()
        .await
        .update_workspace(&workspace)
        .await
        .map_err(|e| match e {
            WorkspaceStoreError::WorkspaceNotFound => {
                WorkspaceAPIError::IDNotFoundError(*workspace.id.as_ref())
            }
            e => WorkspaceAPIError::UnexpectedError(eyre!(e)),
        })?;

    Ok((StatusCode::OK, Json(workspace)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub name: Option<String>,
    pub over_allocation_threshold: Option<u16>,
    pub under_utilization_threshold: Option<u16>,
}
