use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{
        parse_budget_hours, parse_client_name, plan_limits::check_project_limit,
        validate_project_dates, Name, Project, ProjectStatus, SkillId,
        UserRole, ValidationError, WorkspaceAPIError,
    },
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_workspace, parse_skill_ids, unexpected},
    },
};

#[tracing::instrument(name = "Create project route handler", skip_all)]
pub async fn create_project(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<ProjectRequest>,
) -> Result<(StatusCode, Json<Project>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let mut project = Project::new(
        user.workspace_id,
        Name::parse("Project name", &request.name)?,
        request.start_date,
        request.end_date,
    )?;
    let skill_ids = parse_skill_ids(
        &state,
        &user.workspace_id,
        &request.required_skill_ids,
    )
    .await?;
    request.apply_to(&mut project, skill_ids)?;

    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let mut project_store = state.project_store.write().await;
    if project.counts_toward_limit() {
        let active_projects = project_store
            .count_active_projects(&user.workspace_id)
            .await
            .map_err(unexpected)?;
        check_project_limit(workspace.effective_plan(Utc::now()), active_projects)?;
    }

    project_store
        .add_project(project.clone())
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::CREATED, Json(project)))
}

/// Body of both the create and the update request.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    pub name: String,
    pub client_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub budget_hours: Option<f64>,
    #[serde(default)]
    pub required_skill_ids: Vec<String>,
}

impl ProjectRequest {
    /// A missing status leaves the current one in place.
    pub fn apply_to(
        &self,
        project: &mut Project,
        skill_ids: Vec<SkillId>,
    ) -> Result<(), ValidationError> {
        validate_project_dates(self.start_date, self.end_date)?;
        project.name = Name::parse("Project name", &self.name)?;
        project.client_name = parse_client_name(self.client_name.as_deref())?;
        project.start_date = self.start_date;
        project.end_date = self.end_date;
        if let Some(status) = &self.status {
            project.status = status.parse::<ProjectStatus>()?;
        }
        project.budget_hours = parse_budget_hours(self.budget_hours)?;
        project.required_skill_ids = skill_ids;
        Ok(())
    }
}
