use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use serde::Serialize;

use crate::{
    app_state::AppState,
    domain::{
        plan_limits::{check_feature, check_team_member_limit, PlanFeature},
        Skill, TeamMember, UserRole, WorkspaceAPIError,
    },
    services::team_import::{parse_team_csv, RowError},
    utils::{
        auth::get_session_user,
        permissions::require_role,
        workspace::{load_workspace, unexpected},
    },
};

/// Imports team members from a CSV upload. Invalid rows are reported and
/// skipped, but the whole upload is rejected if the valid rows do not fit in
/// the remaining seats.
#[tracing::instrument(name = "Import team members route handler", skip_all)]
pub async fn import_team_members(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(StatusCode, Json<ImportResponse>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    require_role(&user, UserRole::Admin)?;

    let workspace = load_workspace(&state, &user.workspace_id).await?;
    let plan = workspace.effective_plan(Utc::now());
    check_feature(plan, PlanFeature::CsvImport)?;

    let parsed = parse_team_csv(&body)?;

    let mut team_store = state.team_store.write().await;
    let active_members = team_store
        .count_active_team_members(&workspace.id)
        .await
        .map_err(unexpected)?;
    check_team_member_limit(plan, active_members, parsed.rows.len())?;

    let mut skills = team_store
        .list_skills(&workspace.id)
        .await
        .map_err(unexpected)?;
    let mut created_skills: Vec<Skill> = Vec::new();
    let mut imported: Vec<TeamMember> = Vec::with_capacity(parsed.rows.len());

    for row in parsed.rows {
        let mut member =
            TeamMember::new(workspace.id, row.name, row.weekly_capacity);
        member.email = row.email;
        member.role = row.role;

        for skill_name in row.skills {
            let existing = skills
                .iter()
                .find(|skill| skill.matches_name(skill_name.as_ref()))
                .map(|skill| skill.id);
            let skill_id = match existing {
                Some(id) => id,
                None => {
                    let skill = Skill::new(workspace.id, skill_name);
                    team_store
                        .add_skill(skill.clone())
                        .await
                        .map_err(unexpected)?;
                    skills.push(skill.clone());
                    created_skills.push(skill.clone());
                    skill.id
                }
            };
            if !member.skill_ids.contains(&skill_id) {
                member.skill_ids.push(skill_id);
            }
        }

        team_store
            .add_team_member(member.clone())
            .await
            .map_err(unexpected)?;
        imported.push(member);
    }

    tracing::info!(
        imported = imported.len(),
        rejected = parsed.errors.len(),
        "team members imported"
    );

    Ok((
        StatusCode::OK,
        Json(ImportResponse {
            imported,
            created_skills,
            errors: parsed.errors,
        }),
    ))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub imported: Vec<TeamMember>,
    pub created_skills: Vec<Skill>,
    pub errors: Vec<RowError>,
}
