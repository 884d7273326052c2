use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::CookieJar;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{
        Assignment, AssignmentFilter, DateRange, ProjectId, TeamMemberId,
        ValidationError, WorkspaceAPIError,
    },
    utils::{auth::get_session_user, workspace::unexpected},
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsQuery {
    pub team_member_id: Option<String>,
    pub project_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ListAssignmentsQuery {
    fn to_filter(&self) -> Result<AssignmentFilter, ValidationError> {
        let window = match (self.from, self.to) {
            (None, None) => None,
            (Some(from), Some(to)) => Some(DateRange::parse(from, to)?),
            _ => {
                return Err(ValidationError::new(String::from(
                    "Both from and to are required to filter by dates",
                )))
            }
        };
        Ok(AssignmentFilter {
            team_member_id: self
                .team_member_id
                .as_deref()
                .map(TeamMemberId::parse)
                .transpose()?,
            project_id: self
                .project_id
                .as_deref()
                .map(ProjectId::parse)
                .transpose()?,
            window,
        })
    }
}

#[tracing::instrument(name = "List assignments route handler", skip_all)]
pub async fn list_assignments(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ListAssignmentsQuery>,
) -> Result<(StatusCode, Json<Vec<Assignment>>), WorkspaceAPIError> {
    let user = get_session_user(&jar, &state).await?;
    let filter = query.to_filter()?;

    let assignments = state
        .project_store
        .read()
        .await
        .list_assignments(&user.workspace_id, &filter)
        .await
        .map_err(unexpected)?;

    Ok((StatusCode::OK, Json(assignments)))
}
