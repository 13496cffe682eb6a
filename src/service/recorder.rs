use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    error::AccessError,
    model::{
        access_event::{ExitUpdate, NewEntry},
        health_status::HealthStatus,
        work_area::WorkArea,
    },
    store::AccessStore,
};

/// Wall-clock source. Local time; nothing is converted to UTC.
///
/// One reading serves both the event date and its time so the two can never
/// straddle midnight.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Gate submission. The same payload serves entry and exit; the recorder
/// picks the branch from what is already stored.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[schema(example = json!({
    "cedula": "123456789",
    "nombre": "Ana Ruiz",
    "estado_salud": "Bien",
    "lugar_trabajo": "Mina Norte",
    "observacion": null
}))]
pub struct RegisterAccess {
    #[serde(default)]
    pub cedula: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub estado_salud: String,
    #[serde(default)]
    pub lugar_trabajo: String,
    pub observacion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Entrada,
    Salida,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Recorded {
    pub detail: String,
    pub kind: AccessKind,
    pub id: u64,
}

struct ValidAccess<'a> {
    cedula: &'a str,
    nombre: &'a str,
    health_status: HealthStatus,
    work_area: WorkArea,
    notes: Option<String>,
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, AccessError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AccessError::validation(format!("{} is required", field)));
    }
    Ok(value)
}

fn validate(req: &RegisterAccess) -> Result<ValidAccess<'_>, AccessError> {
    let cedula = required(&req.cedula, "cedula")?;
    let nombre = required(&req.nombre, "nombre")?;
    let estado_salud = required(&req.estado_salud, "estado_salud")?;
    let lugar_trabajo = required(&req.lugar_trabajo, "lugar_trabajo")?;

    let health_status = HealthStatus::from_str(estado_salud).map_err(|_| {
        AccessError::validation("Invalid estado_salud. Allowed: Bien, Regular, Mal")
    })?;
    let work_area = WorkArea::from_str(lugar_trabajo).map_err(|_| {
        AccessError::validation(
            "Invalid lugar_trabajo. Allowed: Mina Norte, Mina Sur, Procesamiento, Administración, Mantenimiento",
        )
    })?;

    let notes = req
        .observacion
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    Ok(ValidAccess {
        cedula,
        nombre,
        health_status,
        work_area,
        notes,
    })
}

/// Single write path for gate events.
///
/// With no open event for the person today a new entry is created; otherwise
/// the open event is closed with the exit time, and its health status and
/// notes are replaced by the submitted ones. The stored work area is kept.
pub async fn record_access(
    store: &dyn AccessStore,
    clock: &dyn Clock,
    req: &RegisterAccess,
) -> Result<Recorded, AccessError> {
    let access = validate(req)?;

    let person = store
        .find_person(access.cedula)
        .await?
        .ok_or_else(|| AccessError::not_found("Empleado no encontrado"))?;

    if !person.name_matches(access.nombre) {
        warn!(cedula = access.cedula, "Submitted name does not match directory");
        return Err(AccessError::validation(
            "La cédula o el nombre no están registrados en el sistema",
        ));
    }

    let stamp = clock.now();
    let (today, now) = (stamp.date(), stamp.time());

    match store.open_event(access.cedula, today).await? {
        Some(open) => {
            let closed = store
                .close_event(
                    open.id,
                    ExitUpdate {
                        exit_time: now,
                        health_status: access.health_status,
                        notes: access.notes,
                    },
                )
                .await?;

            if !closed {
                // Removed or closed between the lookup and the update.
                return Err(AccessError::not_found("Registro de entrada no encontrado"));
            }

            info!(id = open.id, cedula = access.cedula, kind = "salida", "Exit recorded");
            Ok(Recorded {
                detail: "Salida registrada correctamente".to_string(),
                kind: AccessKind::Salida,
                id: open.id,
            })
        }
        None => {
            let event = store
                .insert_entry(NewEntry {
                    employee_id: person.cedula,
                    employee_name: person.name,
                    date: today,
                    entry_time: now,
                    work_area: access.work_area,
                    health_status: access.health_status,
                    notes: access.notes,
                })
                .await?;

            info!(id = event.id, cedula = access.cedula, kind = "entrada", "Entry recorded");
            Ok(Recorded {
                detail: "Entrada registrada correctamente".to_string(),
                kind: AccessKind::Entrada,
                id: event.id,
            })
        }
    }
}
