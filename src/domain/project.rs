use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{
    validate_date, Name, ProjectId, SkillId, ValidationError, WorkspaceId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Cancelled)
    }
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(ProjectStatus::Planning),
            "active" => Ok(ProjectStatus::Active),
            "on_hold" => Ok(ProjectStatus::OnHold),
            "completed" => Ok(ProjectStatus::Completed),
            "cancelled" => Ok(ProjectStatus::Cancelled),
            _ => Err(ValidationError::new(format!(
                "Invalid project status: {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    #[serde(skip_serializing)]
    pub workspace_id: WorkspaceId,
    pub name: Name,
    pub client_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub budget_hours: Option<f64>,
    pub required_skill_ids: Vec<SkillId>,
    pub active: bool,
}

impl Project {
    pub fn new(
        workspace_id: WorkspaceId,
        name: Name,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        validate_project_dates(start_date, end_date)?;
        Ok(Self {
            id: ProjectId::default(),
            workspace_id,
            name,
            client_name: None,
            start_date,
            end_date,
            status: ProjectStatus::Planning,
            budget_hours: None,
            required_skill_ids: Vec::new(),
            active: true,
        })
    }

    /// Archived and closed projects do not count against the plan.
    pub fn counts_toward_limit(&self) -> bool {
        self.active && !self.status.is_closed()
    }
}

pub fn validate_project_dates(
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    validate_date(start_date)?;
    if let Some(end) = end_date {
        validate_date(end)?;
    }
    match end_date {
        Some(end) if end < start_date => Err(ValidationError::new(
            String::from("End date cannot be before start date"),
        )),
        _ => Ok(()),
    }
}

pub fn parse_budget_hours(
    budget: Option<f64>,
) -> Result<Option<f64>, ValidationError> {
    match budget {
        Some(hours) if !hours.is_finite() || hours < 0.0 => {
            Err(ValidationError::new(String::from(
                "Budget hours cannot be negative",
            )))
        }
        budget => Ok(budget),
    }
}

pub fn parse_client_name(
    client: Option<&str>,
) -> Result<Option<String>, ValidationError> {
    match client.map(str::trim) {
        None | Some("") => Ok(None),
        Some(client) => {
            Name::parse("Client name", client).map(|c| Some(c.as_ref().to_owned()))
        }
    }
}
