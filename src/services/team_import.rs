//! Parsing of team member CSV uploads.
//!
//! Expected header: `name,email,role,weekly_capacity_hours,skills`. Email,
//! role and skills may be blank, skills are separated by `;` and a blank
//! capacity means the default 40 hours.

use csv::{ReaderBuilder, StringRecord, Trim};
use secrecy::Secret;
use serde::Serialize;

use crate::domain::{
    parse_job_role, Email, Name, Skill, ValidationError, WeeklyHours,
    DEFAULT_WEEKLY_CAPACITY,
};

pub const IMPORT_HEADER: [&str; 5] =
    ["name", "email", "role", "weekly_capacity_hours", "skills"];
pub const MAX_IMPORT_ROWS: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub line: u64,
    pub name: Name,
    pub email: Option<Email>,
    pub role: Option<String>,
    pub weekly_capacity: WeeklyHours,
    pub skills: Vec<Name>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub line: u64,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    pub errors: Vec<RowError>,
}

/// Splits the upload into valid rows and per-line errors. Only a missing or
/// wrong header, or an oversized file, rejects the whole upload.
pub fn parse_team_csv(data: &[u8]) -> Result<ParsedImport, ValidationError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data);

    let headers = reader.headers().map_err(|e| {
        ValidationError::new(format!("Unable to read CSV header: {e}"))
    })?;
    let header_matches = headers.len() == IMPORT_HEADER.len()
        && headers
            .iter()
            .zip(IMPORT_HEADER)
            .all(|(found, expected)| found.eq_ignore_ascii_case(expected));
    if !header_matches {
        return Err(ValidationError::new(format!(
            "CSV header must be: {}",
            IMPORT_HEADER.join(",")
        )));
    }

    let mut parsed = ParsedImport::default();
    for (index, result) in reader.records().enumerate() {
        if index >= MAX_IMPORT_ROWS {
            return Err(ValidationError::new(format!(
                "CSV import is limited to {MAX_IMPORT_ROWS} rows"
            )));
        }
        // Header is line 1.
        let fallback_line = index as u64 + 2;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map_or(fallback_line, |position| position.line());
                if record.iter().all(str::is_empty) {
                    continue;
                }
                match parse_record(line, &record) {
                    Ok(row) => parsed.rows.push(row),
                    Err(e) => parsed.errors.push(RowError {
                        line,
                        message: e.as_ref().to_owned(),
                    }),
                }
            }
            Err(e) => parsed.errors.push(RowError {
                line: e
                    .position()
                    .map_or(fallback_line, |position| position.line()),
                message: format!("Unreadable row: {e}"),
            }),
        }
    }
    Ok(parsed)
}

fn field<'a>(record: &'a StringRecord, index: usize) -> Option<&'a str> {
    record.get(index).filter(|value| !value.is_empty())
}

fn parse_record(
    line: u64,
    record: &StringRecord,
) -> Result<ImportRow, ValidationError> {
    let name = Name::parse("Name", field(record, 0).unwrap_or_default())?;
    let email = field(record, 1)
        .map(|email| Email::parse(Secret::new(email.to_owned())))
        .transpose()?;
    let role = parse_job_role(field(record, 2))?;
    let capacity = match field(record, 3) {
        None => DEFAULT_WEEKLY_CAPACITY,
        Some(hours) => hours.parse::<f64>().map_err(|_| {
            ValidationError::new(format!("Invalid weekly capacity: {hours}"))
        })?,
    };
    let weekly_capacity = WeeklyHours::capacity(capacity)?;

    let mut skills: Vec<Name> = Vec::new();
    for skill in field(record, 4).unwrap_or_default().split(';') {
        if skill.trim().is_empty() {
            continue;
        }
        let skill = Skill::parse_name(skill)?;
        let duplicate = skills.iter().any(|s| {
            s.as_ref().to_lowercase() == skill.as_ref().to_lowercase()
        });
        if !duplicate {
            skills.push(skill);
        }
    }

    Ok(ImportRow {
        line,
        name,
        email,
        role,
        weekly_capacity,
        skills,
    })
}
