mod create_assignment;
mod delete_assignment;
mod list_assignments;
mod update_assignment;

pub use create_assignment::*;
pub use delete_assignment::*;
pub use list_assignments::*;
pub use update_assignment::*;

use crate::{
    app_state::AppState,
    domain::{
        capacity::{over_allocated_weeks, week_end, week_start, OverAllocation},
        AssignmentFilter, DateRange, TeamMember, Workspace, WorkspaceAPIError,
    },
    utils::workspace::unexpected,
};

/// Over-allocated weeks of `member` across every week `dates` touches, with
/// the member's stored assignments.
async fn over_allocation_warnings(
    state: &AppState,
    workspace: &Workspace,
    member: &TeamMember,
    dates: &DateRange,
) -> Result<Vec<OverAllocation>, WorkspaceAPIError> {
    let filter = AssignmentFilter {
        team_member_id: Some(member.id),
        window: Some(DateRange {
            start: week_start(dates.start),
            end: week_end(week_start(dates.end)),
        }),
        ..AssignmentFilter::default()
    };
    let assignments = state
        .project_store
        .read()
        .await
        .list_assignments(&workspace.id, &filter)
        .await
        .map_err(unexpected)?;

    let warnings =
        over_allocated_weeks(member, &assignments, dates, &workspace.thresholds);
    if !warnings.is_empty() {
        tracing::debug!(
            team_member_id = %member.id,
            weeks = warnings.len(),
            "assignment over-allocates team member"
        );
    }
    Ok(warnings)
}
