mod dashboard;
mod export_report;
mod member_capacity;
mod over_allocations;
mod utilization;

pub use dashboard::*;
pub use export_report::*;
pub use member_capacity::*;
pub use over_allocations::*;
pub use utilization::*;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::{
    app_state::AppState,
    domain::{
        capacity::{
            week_end, week_start, weeks_in_range, DEFAULT_REPORT_WEEKS,
            MAX_REPORT_WEEKS,
        },
        validate_date, Assignment, AssignmentFilter, DateRange, TeamMember,
        ValidationError, Workspace, WorkspaceAPIError, WorkspaceId,
    },
    utils::workspace::{load_workspace, unexpected},
};

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub weeks: Option<u32>,
}

/// First Monday and number of weeks a report covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportWindow {
    pub from: NaiveDate,
    pub weeks: u32,
}

impl ReportWindow {
    pub fn parse(query: &ReportQuery, today: NaiveDate) -> Result<Self, ValidationError> {
        let weeks = query.weeks.unwrap_or(DEFAULT_REPORT_WEEKS);
        if !(1..=MAX_REPORT_WEEKS).contains(&weeks) {
            return Err(ValidationError::new(format!(
                "Weeks must be between 1 and {MAX_REPORT_WEEKS}"
            )));
        }
        let from = validate_date(query.from.unwrap_or(today))?;
        Ok(Self {
            from: week_start(from),
            weeks,
        })
    }

    pub fn date_range(&self) -> DateRange {
        let last = weeks_in_range(self.from, self.weeks)
            .last()
            .copied()
            .unwrap_or(self.from);
        DateRange {
            start: self.from,
            end: week_end(last),
        }
    }
}

/// Everything the utilization reports are computed from.
pub struct CapacityInputs {
    pub workspace: Workspace,
    pub members: Vec<TeamMember>,
    pub assignments: Vec<Assignment>,
}

pub async fn load_capacity_inputs(
    state: &AppState,
    workspace_id: &WorkspaceId,
    window: &ReportWindow,
) -> Result<CapacityInputs, WorkspaceAPIError> {
    let workspace = load_workspace(state, workspace_id).await?;
    let members = state
        .team_store
        .read()
        .await
        .list_team_members(workspace_id, false)
        .await
        .map_err(unexpected)?;
    let range = window.date_range();
    let assignments = state
        .project_store
        .read()
        .await
        .list_assignments(
            workspace_id,
            &AssignmentFilter::overlapping(range.start, range.end),
        )
        .await
        .map_err(unexpected)?;

    Ok(CapacityInputs {
        workspace,
        members,
        assignments,
    })
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
