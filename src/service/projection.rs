use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{error::AccessError, model::access_event::AccessEvent};

/// Placeholder shown for the missing half in the combined view.
pub const MISSING_TIME: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Lens {
    #[default]
    All,
    Entries,
    Exits,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DisplayRow {
    pub id: u64,
    pub employee_name: String,
    pub employee_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_time: Option<String>,
    /// DD/MM/YYYY
    pub date: String,
    pub work_area: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ViewQuery {
    /// all | entries | exits
    #[param(value_type = Option<String>)]
    pub lens: Option<Lens>,
    /// Exact cédula; replaces the full log with the search result
    pub cedula: Option<String>,
    /// Name fragment; replaces the full log with the search result
    pub nombres: Option<String>,
    /// Free-text filter over name, cédula and area
    pub q: Option<String>,
    /// Only events of this day, DD/MM/YYYY as shown in the rows
    pub fecha: Option<String>,
}

/// `YYYY-MM-DD` to `DD/MM/YYYY` by reordering fields. Anything that does not
/// split into three parts is returned unchanged.
pub fn format_display_date(iso: &str) -> String {
    match iso.split('-').collect::<Vec<_>>()[..] {
        [year, month, day] => format!("{}/{}/{}", day, month, year),
        _ => iso.to_string(),
    }
}

/// Inverse of [`format_display_date`].
pub fn parse_display_date(display: &str) -> String {
    match display.split('/').collect::<Vec<_>>()[..] {
        [day, month, year] => format!("{}-{}-{}", year, month, day),
        _ => display.to_string(),
    }
}

/// Reads a date typed the way rows display it. `YYYY-MM-DD` passes through.
pub fn parse_filter_date(display: &str) -> Result<NaiveDate, AccessError> {
    let display = display.trim();
    NaiveDate::parse_from_str(&parse_display_date(display), "%Y-%m-%d")
        .map_err(|_| AccessError::validation(format!("Invalid fecha {:?}, expected DD/MM/YYYY", display)))
}

/// Truncates to hour:minute. Times are already local.
pub fn format_clock(time: &NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn clock_or_placeholder(time: Option<&NaiveTime>) -> String {
    time.map(format_clock)
        .unwrap_or_else(|| MISSING_TIME.to_string())
}

fn row(event: &AccessEvent, entry_time: Option<String>, exit_time: Option<String>) -> DisplayRow {
    DisplayRow {
        id: event.id,
        employee_name: event.employee_name.clone(),
        employee_id: event.employee_id.clone(),
        entry_time,
        exit_time,
        date: format_display_date(&event.date.format("%Y-%m-%d").to_string()),
        work_area: event.work_area.to_string(),
    }
}

/// Projects events through a lens, preserving input order.
pub fn project(events: &[AccessEvent], lens: Lens) -> Vec<DisplayRow> {
    match lens {
        Lens::All => events
            .iter()
            .map(|e| {
                row(
                    e,
                    Some(clock_or_placeholder(e.entry_time.as_ref())),
                    Some(clock_or_placeholder(e.exit_time.as_ref())),
                )
            })
            .collect(),
        Lens::Entries => events
            .iter()
            .filter_map(|e| e.entry_time.as_ref().map(|t| row(e, Some(format_clock(t)), None)))
            .collect(),
        Lens::Exits => events
            .iter()
            .filter_map(|e| e.exit_time.as_ref().map(|t| row(e, None, Some(format_clock(t)))))
            .collect(),
    }
}

/// Case-insensitive substring filter over name, cédula and work area.
/// A blank term keeps every row.
pub fn filter_rows(rows: Vec<DisplayRow>, term: &str) -> Vec<DisplayRow> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|r| {
            r.employee_name.to_lowercase().contains(&term)
                || r.employee_id.to_lowercase().contains(&term)
                || r.work_area.to_lowercase().contains(&term)
        })
        .collect()
}
