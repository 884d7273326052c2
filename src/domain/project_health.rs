use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashSet;

use super::{
    capacity::assignment_planned_hours, Assignment, DateRange, Project,
    ProjectId, SkillId, TeamMember,
};

pub const NEARING_BUDGET_RATIO: f64 = 0.9;
pub const OPEN_ENDED_WINDOW_WEEKS: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    AtRisk,
    Critical,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HealthIssue {
    NoAssignments,
    #[serde(rename_all = "camelCase")]
    OverBudget { planned_hours: f64, budget_hours: f64 },
    #[serde(rename_all = "camelCase")]
    NearingBudget { planned_hours: f64, budget_hours: f64 },
    #[serde(rename_all = "camelCase")]
    PastEndDate { end_date: NaiveDate },
    #[serde(rename_all = "camelCase")]
    MissingSkills { skill_ids: Vec<SkillId> },
}

impl HealthIssue {
    fn is_critical(&self) -> bool {
        matches!(
            self,
            HealthIssue::OverBudget { .. } | HealthIssue::PastEndDate { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectHealth {
    pub project_id: ProjectId,
    pub status: HealthStatus,
    pub issues: Vec<HealthIssue>,
    pub planned_hours: f64,
    pub budget_hours: Option<f64>,
    pub budget_used_ratio: Option<f64>,
}

/// Classifies a project from its assignments. `assignments` may include
/// other projects' assignments; only this project's are considered.
/// `members` is used to resolve the skills of assigned people.
pub fn project_health(
    project: &Project,
    assignments: &[Assignment],
    members: &[TeamMember],
    today: NaiveDate,
) -> ProjectHealth {
    let own: Vec<&Assignment> = assignments
        .iter()
        .filter(|a| a.project_id == project.id)
        .collect();

    let planned_hours: f64 =
        own.iter().map(|a| assignment_planned_hours(a, None)).sum();
    let budget_used_ratio = project
        .budget_hours
        .filter(|budget| *budget > 0.0)
        .map(|budget| planned_hours / budget);

    if project.status.is_closed() {
        return ProjectHealth {
            project_id: project.id,
            status: HealthStatus::Closed,
            issues: Vec::new(),
            planned_hours,
            budget_hours: project.budget_hours,
            budget_used_ratio,
        };
    }

    let mut issues = Vec::new();

    if let Some(window) = remaining_window(project, today) {
        if !own.iter().any(|a| a.dates.overlaps(&window)) {
            issues.push(HealthIssue::NoAssignments);
        }
    }

    if let Some(budget_hours) = project.budget_hours {
        if planned_hours > budget_hours {
            issues.push(HealthIssue::OverBudget {
                planned_hours,
                budget_hours,
            });
        } else if budget_hours > 0.0
            && planned_hours >= budget_hours * NEARING_BUDGET_RATIO
        {
            issues.push(HealthIssue::NearingBudget {
                planned_hours,
                budget_hours,
            });
        }
    }

    if let Some(end_date) = project.end_date {
        if end_date < today {
            issues.push(HealthIssue::PastEndDate { end_date });
        }
    }

    let missing = missing_skills(project, &own, members);
    if !missing.is_empty() {
        issues.push(HealthIssue::MissingSkills { skill_ids: missing });
    }

    let status = if issues.iter().any(HealthIssue::is_critical) {
        HealthStatus::Critical
    } else if issues.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::AtRisk
    };

    ProjectHealth {
        project_id: project.id,
        status,
        issues,
        planned_hours,
        budget_hours: project.budget_hours,
        budget_used_ratio,
    }
}

/// The part of the project still ahead of `today`, or `None` once it ended.
fn remaining_window(project: &Project, today: NaiveDate) -> Option<DateRange> {
    let start = project.start_date.max(today);
    let end = match project.end_date {
        Some(end) if end < today => return None,
        Some(end) => end,
        None => start
            .checked_add_signed(Duration::weeks(OPEN_ENDED_WINDOW_WEEKS))
            .unwrap_or(NaiveDate::MAX),
    };
    Some(DateRange { start, end })
}

fn missing_skills(
    project: &Project,
    assignments: &[&Assignment],
    members: &[TeamMember],
) -> Vec<SkillId> {
    let assigned: HashSet<_> =
        assignments.iter().map(|a| a.team_member_id).collect();
    let covered: HashSet<SkillId> = members
        .iter()
        .filter(|m| assigned.contains(&m.id))
        .flat_map(|m| m.skill_ids.iter().copied())
        .collect();

    project
        .required_skill_ids
        .iter()
        .filter(|skill| !covered.contains(*skill))
        .copied()
        .collect()
}
