use color_eyre::eyre::{eyre, Context, Result};
use csv::Writer;

use crate::domain::capacity::TeamUtilizationReport;

pub const UTILIZATION_CSV_HEADER: [&str; 7] = [
    "member",
    "role",
    "week_start",
    "allocated_hours",
    "capacity_hours",
    "utilization_percent",
    "status",
];

/// One row per member and week. The percentage is empty when the member has
/// no capacity that week.
pub fn utilization_csv(report: &TeamUtilizationReport) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(UTILIZATION_CSV_HEADER)?;

    for member in &report.members {
        for week in &member.weeks {
            let percent = week
                .ratio
                .map(|ratio| format!("{:.1}", ratio * 100.0))
                .unwrap_or_default();
            let week_start = week.week_start.format("%Y-%m-%d").to_string();
            let allocated = week.allocated_hours.to_string();
            let capacity = week.capacity_hours.to_string();
            let record: [&str; 7] = [
                member.name.as_ref().as_str(),
                member.role.as_deref().unwrap_or_default(),
                &week_start,
                &allocated,
                &capacity,
                &percent,
                week.status.as_str(),
            ];
            writer.write_record(record)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| eyre!("failed to flush CSV: {e}"))?;
    String::from_utf8(bytes).wrap_err("CSV output is not UTF-8")
}
