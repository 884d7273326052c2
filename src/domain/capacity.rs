//! Weekly capacity and utilization arithmetic.
//!
//! Weeks run Monday to Sunday and every date range is inclusive. An
//! assignment contributes its full `hours_per_week` to each week its range
//! touches, even if it only covers part of that week.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::{
    Assignment, DateRange, Name, TeamMember, TeamMemberId,
    UtilizationThresholds,
};

pub const DEFAULT_REPORT_WEEKS: u32 = 4;
pub const MAX_REPORT_WEEKS: u32 = 26;

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(i64::from(
        date.weekday().num_days_from_monday(),
    )))
    .unwrap_or(NaiveDate::MIN)
}

/// The Sunday closing the week that starts on `week_start`.
pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start
        .checked_add_signed(Duration::days(6))
        .unwrap_or(NaiveDate::MAX)
}

pub fn week_range(week_start: NaiveDate) -> DateRange {
    DateRange {
        start: week_start,
        end: week_end(week_start),
    }
}

/// `weeks` consecutive week starts, beginning with the week containing `from`.
/// Stops early at the end of the calendar.
pub fn weeks_in_range(from: NaiveDate, weeks: u32) -> Vec<NaiveDate> {
    let first = week_start(from);
    (0..weeks)
        .map_while(|i| first.checked_add_signed(Duration::weeks(i64::from(i))))
        .collect()
}

pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Number of calendar weeks the range touches.
pub fn weeks_touched(range: &DateRange) -> u32 {
    let days = (week_start(range.end) - week_start(range.start)).num_days();
    u32::try_from(days / 7 + 1).unwrap_or(u32::MAX)
}

/// Hours an assignment commits over its lifetime, or only within `window`.
pub fn assignment_planned_hours(
    assignment: &Assignment,
    window: Option<&DateRange>,
) -> f64 {
    let range = match window {
        Some(window) => match assignment.dates.intersection(window) {
            Some(range) => range,
            None => return 0.0,
        },
        None => assignment.dates,
    };
    assignment.hours_per_week.value_of() * f64::from(weeks_touched(&range))
}

/// Sum of a member's weekly hours across assignments overlapping the week.
pub fn allocated_hours(
    team_member_id: &TeamMemberId,
    assignments: &[Assignment],
    week_start: NaiveDate,
) -> f64 {
    let week = week_range(week_start);
    assignments
        .iter()
        .filter(|a| &a.team_member_id == team_member_id)
        .filter(|a| a.dates.overlaps(&week))
        .map(|a| a.hours_per_week.value_of())
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationStatus {
    Unavailable,
    UnderUtilized,
    Healthy,
    OverAllocated,
}

impl UtilizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UtilizationStatus::Unavailable => "unavailable",
            UtilizationStatus::UnderUtilized => "under_utilized",
            UtilizationStatus::Healthy => "healthy",
            UtilizationStatus::OverAllocated => "over_allocated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Utilization {
    pub allocated_hours: f64,
    pub capacity_hours: f64,
    pub ratio: Option<f64>,
    pub status: UtilizationStatus,
}

pub fn utilization(
    allocated: f64,
    capacity: f64,
    thresholds: &UtilizationThresholds,
) -> Utilization {
    if capacity <= 0.0 {
        let status = if allocated > 0.0 {
            UtilizationStatus::OverAllocated
        } else {
            UtilizationStatus::Unavailable
        };
        return Utilization {
            allocated_hours: allocated,
            capacity_hours: capacity,
            ratio: None,
            status,
        };
    }

    // Compared as allocated * 100 against capacity * threshold so that
    // boundary values are exact.
    let allocated_percent = allocated * 100.0;
    let status = if allocated_percent
        > capacity * f64::from(thresholds.over_allocation)
    {
        UtilizationStatus::OverAllocated
    } else if allocated_percent
        < capacity * f64::from(thresholds.under_utilization)
    {
        UtilizationStatus::UnderUtilized
    } else {
        UtilizationStatus::Healthy
    };

    Utilization {
        allocated_hours: allocated,
        capacity_hours: capacity,
        ratio: Some(allocated / capacity),
        status,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekUtilization {
    pub week_start: NaiveDate,
    pub allocated_hours: f64,
    pub capacity_hours: f64,
    pub available_hours: f64,
    pub ratio: Option<f64>,
    pub status: UtilizationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUtilization {
    pub team_member_id: TeamMemberId,
    pub name: Name,
    pub role: Option<String>,
    pub weeks: Vec<WeekUtilization>,
    pub average_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverAllocation {
    pub team_member_id: TeamMemberId,
    pub name: Name,
    pub week_start: NaiveDate,
    pub allocated_hours: f64,
    pub capacity_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamUtilizationReport {
    pub weeks: Vec<NaiveDate>,
    pub members: Vec<MemberUtilization>,
    pub average_ratio: Option<f64>,
    pub over_allocations: Vec<OverAllocation>,
}

fn average(ratios: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = ratios.fold((0.0, 0usize), |(s, c), r| (s + r, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn member_utilization(
    member: &TeamMember,
    assignments: &[Assignment],
    from: NaiveDate,
    weeks: u32,
    thresholds: &UtilizationThresholds,
) -> MemberUtilization {
    let capacity = member.weekly_capacity.value_of();
    let weeks: Vec<WeekUtilization> = weeks_in_range(from, weeks)
        .into_iter()
        .map(|week| {
            let allocated = allocated_hours(&member.id, assignments, week);
            let u = utilization(allocated, capacity, thresholds);
            WeekUtilization {
                week_start: week,
                allocated_hours: allocated,
                capacity_hours: capacity,
                available_hours: (capacity - allocated).max(0.0),
                ratio: u.ratio,
                status: u.status,
            }
        })
        .collect();

    let average_ratio = average(weeks.iter().filter_map(|w| w.ratio));

    MemberUtilization {
        team_member_id: member.id,
        name: member.name.clone(),
        role: member.role.clone(),
        weeks,
        average_ratio,
    }
}

fn over_allocations_of(row: &MemberUtilization) -> Vec<OverAllocation> {
    row.weeks
        .iter()
        .filter(|w| w.status == UtilizationStatus::OverAllocated)
        .map(|w| OverAllocation {
            team_member_id: row.team_member_id,
            name: row.name.clone(),
            week_start: w.week_start,
            allocated_hours: w.allocated_hours,
            capacity_hours: w.capacity_hours,
        })
        .collect()
}

/// Utilization of every active member. Inactive members are skipped.
pub fn team_utilization(
    members: &[TeamMember],
    assignments: &[Assignment],
    from: NaiveDate,
    weeks: u32,
    thresholds: &UtilizationThresholds,
) -> TeamUtilizationReport {
    let rows: Vec<MemberUtilization> = members
        .iter()
        .filter(|m| m.active)
        .map(|m| member_utilization(m, assignments, from, weeks, thresholds))
        .collect();

    let average_ratio = average(
        rows.iter()
            .flat_map(|row| row.weeks.iter().filter_map(|w| w.ratio)),
    );
    let over_allocations = rows.iter().flat_map(over_allocations_of).collect();

    TeamUtilizationReport {
        weeks: weeks_in_range(from, weeks),
        members: rows,
        average_ratio,
        over_allocations,
    }
}

pub fn find_over_allocations(
    members: &[TeamMember],
    assignments: &[Assignment],
    from: NaiveDate,
    weeks: u32,
    thresholds: &UtilizationThresholds,
) -> Vec<OverAllocation> {
    team_utilization(members, assignments, from, weeks, thresholds)
        .over_allocations
}

/// Over-allocated weeks for one member across the weeks `range` touches.
pub fn over_allocated_weeks(
    member: &TeamMember,
    assignments: &[Assignment],
    range: &DateRange,
    thresholds: &UtilizationThresholds,
) -> Vec<OverAllocation> {
    let row = member_utilization(
        member,
        assignments,
        range.start,
        weeks_touched(range),
        thresholds,
    );
    over_allocations_of(&row)
}
