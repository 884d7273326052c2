use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use secrecy::Secret;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{
        parse_hourly_rate, parse_job_role, plan_limits::check_team_member_limit,
        Email, Name, SkillId, TeamMember, UserRole, ValidationError,
        WeeklyHours, WorkspaceAPIError, DEFAULT_WEEKLY_CAPACITY,
    },
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_workspace, parse_skill_ids, unexpected},
    },
};

#[tracing::instrument(name = "Create team member route handler", skip_all)]
pub async fn create_team_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<TeamMemberRequest>,
) -> Result<(StatusCode, Json<TeamMember>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let skill_ids =
        parse_skill_ids(&state, &user.workspace_id, &request.skill_ids).await?;
    let mut member = TeamMember::new(
        user.workspace_id,
        Name::parse("Name", &request.name)?,
        WeeklyHours::capacity(DEFAULT_WEEKLY_CAPACITY)?,
    );
    request.apply_to(&mut member, skill_ids)?;

    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let mut team_store = state.team_store.write().await;
    let active_members = team_store
        .count_active_team_members(&user.workspace_id)
        .await
        .map_err(unexpected)?;
    check_team_member_limit(workspace.effective_plan(Utc::now()), active_members, 1)?;

    team_store
        .add_team_member(member.clone())
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::CREATED, Json(member)))
}

/// Body of both the create and the update request. Optional fields left out
/// of an update are cleared, capacity falls back to the default.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberRequest {
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub weekly_capacity_hours: Option<f64>,
    #[serde(default)]
    pub skill_ids: Vec<String>,
    pub hourly_rate: Option<f64>,
}

impl TeamMemberRequest {
    pub fn apply_to(
        &self,
        member: &mut TeamMember,
        skill_ids: Vec<SkillId>,
    ) -> Result<(), ValidationError> {
        member.name = Name::parse("Name", &self.name)?;
        member.email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(email) => Some(Email::parse(Secret::new(email.to_owned()))?),
        };
        member.role = parse_job_role(self.role.as_deref())?;
        member.weekly_capacity = WeeklyHours::capacity(
            self.weekly_capacity_hours.unwrap_or(DEFAULT_WEEKLY_CAPACITY),
        )?;
        member.skill_ids = skill_ids;
        member.hourly_rate = parse_hourly_rate(self.hourly_rate)?;
        Ok(())
    }
}
