use serde::Serialize;
use std::fmt;
use thiserror::Error;

use super::Plan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub max_team_members: Option<u32>,
    pub max_users: Option<u32>,
    pub max_active_projects: Option<u32>,
    pub csv_import: bool,
    pub report_export: bool,
}

impl Plan {
    pub fn limits(&self) -> PlanLimits {
        match self {
            Plan::Free => PlanLimits {
                max_team_members: Some(5),
                max_users: Some(2),
                max_active_projects: Some(3),
                csv_import: false,
                report_export: false,
            },
            Plan::Starter => PlanLimits {
                max_team_members: Some(15),
                max_users: Some(5),
                max_active_projects: Some(20),
                csv_import: true,
                report_export: false,
            },
            Plan::Pro => PlanLimits {
                max_team_members: Some(50),
                max_users: Some(20),
                max_active_projects: None,
                csv_import: true,
                report_export: true,
            },
            Plan::Agency => PlanLimits {
                max_team_members: None,
                max_users: None,
                max_active_projects: None,
                csv_import: true,
                report_export: true,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitedResource {
    TeamMembers,
    Users,
    ActiveProjects,
}

impl fmt::Display for LimitedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LimitedResource::TeamMembers => "team members",
            LimitedResource::Users => "users",
            LimitedResource::ActiveProjects => "active projects",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFeature {
    CsvImport,
    ReportExport,
}

impl fmt::Display for PlanFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanFeature::CsvImport => "CSV import",
            PlanFeature::ReportExport => "report export",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PlanLimitError {
    #[error("Plan limit reached: the {plan} plan allows {limit} {resource}")]
    LimitReached {
        plan: Plan,
        resource: LimitedResource,
        limit: u32,
    },
    #[error("The {feature} feature is not available on the {plan} plan")]
    FeatureUnavailable { plan: Plan, feature: PlanFeature },
}

fn limit_for(plan: Plan, resource: LimitedResource) -> Option<u32> {
    let limits = plan.limits();
    match resource {
        LimitedResource::TeamMembers => limits.max_team_members,
        LimitedResource::Users => limits.max_users,
        LimitedResource::ActiveProjects => limits.max_active_projects,
    }
}

/// Fails when `current + adding` would exceed the plan's limit.
pub fn check_limit(
    plan: Plan,
    resource: LimitedResource,
    current: usize,
    adding: usize,
) -> Result<(), PlanLimitError> {
    match limit_for(plan, resource) {
        Some(limit) if current + adding > limit as usize => {
            Err(PlanLimitError::LimitReached {
                plan,
                resource,
                limit,
            })
        }
        _ => Ok(()),
    }
}

pub fn check_team_member_limit(
    plan: Plan,
    active_team_members: usize,
    adding: usize,
) -> Result<(), PlanLimitError> {
    check_limit(plan, LimitedResource::TeamMembers, active_team_members, adding)
}

/// Pending invites hold a seat until they are accepted or expire.
pub fn check_user_limit(
    plan: Plan,
    active_users: usize,
    pending_invites: usize,
) -> Result<(), PlanLimitError> {
    check_limit(plan, LimitedResource::Users, active_users + pending_invites, 1)
}

pub fn check_project_limit(
    plan: Plan,
    active_projects: usize,
) -> Result<(), PlanLimitError> {
    check_limit(plan, LimitedResource::ActiveProjects, active_projects, 1)
}

pub fn check_feature(
    plan: Plan,
    feature: PlanFeature,
) -> Result<(), PlanLimitError> {
    let limits = plan.limits();
    let enabled = match feature {
        PlanFeature::CsvImport => limits.csv_import,
        PlanFeature::ReportExport => limits.report_export,
    };
    if enabled {
        Ok(())
    } else {
        Err(PlanLimitError::FeatureUnavailable { plan, feature })
    }
}

/// Seats left before the limit, `None` when unlimited.
pub fn remaining(plan: Plan, resource: LimitedResource, used: usize) -> Option<usize> {
    limit_for(plan, resource).map(|limit| (limit as usize).saturating_sub(used))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageLine {
    pub used: usize,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanUsage {
    pub team_members: UsageLine,
    pub users: UsageLine,
    pub active_projects: UsageLine,
}

pub fn usage(
    plan: Plan,
    team_members: usize,
    users: usize,
    active_projects: usize,
) -> PlanUsage {
    let limits = plan.limits();
    PlanUsage {
        team_members: UsageLine {
            used: team_members,
            limit: limits.max_team_members,
        },
        users: UsageLine {
            used: users,
            limit: limits.max_users,
        },
        active_projects: UsageLine {
            used: active_projects,
            limit: limits.max_active_projects,
        },
    }
}
