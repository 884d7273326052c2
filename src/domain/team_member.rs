use serde::{Deserialize, Serialize};

use super::{Email, Name, SkillId, TeamMemberId, ValidationError, WorkspaceId};

pub const HOURS_IN_WEEK: f64 = 168.0;
pub const DEFAULT_WEEKLY_CAPACITY: f64 = 40.0;

/// A number of hours per week, between 0 and 168.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct WeeklyHours(f64);

impl WeeklyHours {
    /// Capacity may be zero, e.g. for someone on extended leave.
    pub fn capacity(hours: f64) -> Result<Self, ValidationError> {
        if !hours.is_finite() || !(0.0..=HOURS_IN_WEEK).contains(&hours) {
            return Err(ValidationError::new(format!(
                "Weekly capacity must be between 0 and {HOURS_IN_WEEK} hours"
            )));
        }
        Ok(Self(hours))
    }

    /// Allocated hours must be positive.
    pub fn allocation(hours: f64) -> Result<Self, ValidationError> {
        if !hours.is_finite() || hours <= 0.0 || hours > HOURS_IN_WEEK {
            return Err(ValidationError::new(format!(
                "Hours per week must be greater than 0 and at most {HOURS_IN_WEEK}"
            )));
        }
        Ok(Self(hours))
    }

    pub fn value_of(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: TeamMemberId,
    #[serde(skip_serializing)]
    pub workspace_id: WorkspaceId,
    pub name: Name,
    pub email: Option<Email>,
    pub role: Option<String>,
    pub weekly_capacity: WeeklyHours,
    pub skill_ids: Vec<SkillId>,
    pub hourly_rate: Option<f64>,
    pub active: bool,
}

impl TeamMember {
    pub fn new(
        workspace_id: WorkspaceId,
        name: Name,
        weekly_capacity: WeeklyHours,
    ) -> Self {
        Self {
            id: TeamMemberId::default(),
            workspace_id,
            name,
            email: None,
            role: None,
            weekly_capacity,
            skill_ids: Vec::new(),
            hourly_rate: None,
            active: true,
        }
    }

    pub fn has_skill(&self, skill_id: &SkillId) -> bool {
        self.skill_ids.contains(skill_id)
    }
}

/// Job titles are free text but bounded like names.
pub fn parse_job_role(role: Option<&str>) -> Result<Option<String>, ValidationError> {
    match role.map(str::trim) {
        None | Some("") => Ok(None),
        Some(role) => Name::parse("Role", role).map(|r| Some(r.as_ref().to_owned())),
    }
}

pub fn parse_hourly_rate(rate: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match rate {
        Some(rate) if !rate.is_finite() || rate < 0.0 => Err(
            ValidationError::new(String::from("Hourly rate cannot be negative")),
        ),
        rate => Ok(rate),
    }
}
