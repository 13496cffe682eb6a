use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{health_status::HealthStatus, work_area::WorkArea};

/// One gate passage for a person on a given day. Created on entry, closed
/// (exit fields filled) on the matching exit, removed only by an admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": "123456789",
        "employee_name": "Ana Ruiz",
        "date": "2026-03-02",
        "entry_time": "06:58:12",
        "exit_time": null,
        "work_area": "Mina Norte",
        "health_status": "Bien",
        "notes": null
    })
)]
pub struct AccessEvent {
    pub id: u64,
    /// National identification number (cédula)
    pub employee_id: String,
    pub employee_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, example = "06:58:12")]
    pub entry_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "15:02:40")]
    pub exit_time: Option<NaiveTime>,
    pub work_area: WorkArea,
    pub health_status: HealthStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    /// Entry recorded, waiting for the exit.
    Open,
    /// Both halves recorded.
    Complete,
}

impl AccessEvent {
    pub fn state(&self) -> EventState {
        match self.exit_time {
            Some(_) => EventState::Complete,
            None => EventState::Open,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == EventState::Open
    }
}

/// Fields for a fresh entry; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub employee_id: String,
    pub employee_name: String,
    pub date: NaiveDate,
    pub entry_time: NaiveTime,
    pub work_area: WorkArea,
    pub health_status: HealthStatus,
    pub notes: Option<String>,
}

/// Exit half applied to an open event.
#[derive(Debug, Clone)]
pub struct ExitUpdate {
    pub exit_time: NaiveTime,
    pub health_status: HealthStatus,
    pub notes: Option<String>,
}
