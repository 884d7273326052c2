use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{
    AssignmentId, ProjectId, TeamMemberId, ValidationError, WeeklyHours,
    WorkspaceId,
};

const MAX_NOTES_LENGTH: usize = 2000;

pub const MIN_SUPPORTED_YEAR: i32 = 1900;
pub const MAX_SUPPORTED_YEAR: i32 = 2200;
/// Five years.
pub const MAX_ASSIGNMENT_WEEKS: i64 = 260;

/// Rejects dates outside the years the planner works with.
pub fn validate_date(date: NaiveDate) -> Result<NaiveDate, ValidationError> {
    if (MIN_SUPPORTED_YEAR..=MAX_SUPPORTED_YEAR).contains(&date.year()) {
        Ok(date)
    } else {
        Err(ValidationError::new(format!(
            "Dates must fall between the years {MIN_SUPPORTED_YEAR} and {MAX_SUPPORTED_YEAR}"
        )))
    }
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

impl DateRange {
    pub fn parse(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        let start = validate_date(start)?;
        let end = validate_date(end)?;
        if end < start {
            return Err(ValidationError::new(String::from(
                "End date cannot be before start date",
            )));
        }
        Ok(Self { start, end })
    }

    /// An assignment's dates, which may span at most
    /// `MAX_ASSIGNMENT_WEEKS` weeks.
    pub fn parse_assignment(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let range = Self::parse(start, end)?;
        if (range.end - range.start).num_days() >= MAX_ASSIGNMENT_WEEKS * 7 {
            return Err(ValidationError::new(format!(
                "Assignments cannot span more than {MAX_ASSIGNMENT_WEEKS} weeks"
            )));
        }
        Ok(range)
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        if !self.overlaps(other) {
            return None;
        }
        Some(DateRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: AssignmentId,
    #[serde(skip_serializing)]
    pub workspace_id: WorkspaceId,
    pub team_member_id: TeamMemberId,
    pub project_id: ProjectId,
    #[serde(flatten)]
    pub dates: DateRange,
    pub hours_per_week: WeeklyHours,
    pub billable: bool,
    pub notes: Option<String>,
}

impl Assignment {
    pub fn new(
        workspace_id: WorkspaceId,
        team_member_id: TeamMemberId,
        project_id: ProjectId,
        dates: DateRange,
        hours_per_week: WeeklyHours,
    ) -> Self {
        Self {
            id: AssignmentId::default(),
            workspace_id,
            team_member_id,
            project_id,
            dates,
            hours_per_week,
            billable: true,
            notes: None,
        }
    }
}

pub fn parse_notes(notes: Option<&str>) -> Result<Option<String>, ValidationError> {
    match notes.map(str::trim) {
        None | Some("") => Ok(None),
        Some(notes) if notes.chars().count() > MAX_NOTES_LENGTH => {
            Err(ValidationError::new(format!(
                "Notes cannot be longer than {MAX_NOTES_LENGTH} characters"
            )))
        }
        Some(notes) => Ok(Some(notes.to_owned())),
    }
}
