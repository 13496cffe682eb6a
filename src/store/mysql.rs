use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, warn};

use super::{AccessStore, StoreResult};
use crate::{
    error::AccessError,
    model::{
        access_event::{AccessEvent, ExitUpdate, NewEntry},
        health_status::HealthStatus,
        person::Person,
        work_area::WorkArea,
    },
};

const EVENT_COLUMNS: &str = r#"
    id,
    cedula,
    nombre,
    fecha,
    hora_entrada,
    hora_salida,
    lugar_trabajo,
    estado_salud,
    observacion
"#;

#[derive(FromRow)]
struct AccessEventRow {
    id: u64,
    cedula: String,
    nombre: String,
    fecha: NaiveDate,
    hora_entrada: Option<NaiveTime>,
    hora_salida: Option<NaiveTime>,
    lugar_trabajo: String,
    estado_salud: String,
    observacion: Option<String>,
}

impl TryFrom<AccessEventRow> for AccessEvent {
    type Error = sqlx::Error;

    fn try_from(row: AccessEventRow) -> Result<Self, Self::Error> {
        let work_area = WorkArea::from_str(&row.lugar_trabajo).map_err(|_| {
            sqlx::Error::Decode(
                format!(
                    "access event {} has unknown work area {:?}",
                    row.id, row.lugar_trabajo
                )
                .into(),
            )
        })?;
        let health_status = HealthStatus::from_str(&row.estado_salud).map_err(|_| {
            sqlx::Error::Decode(
                format!(
                    "access event {} has unknown health status {:?}",
                    row.id, row.estado_salud
                )
                .into(),
            )
        })?;

        Ok(AccessEvent {
            id: row.id,
            employee_id: row.cedula,
            employee_name: row.nombre,
            date: row.fecha,
            entry_time: row.hora_entrada,
            exit_time: row.hora_salida,
            work_area,
            health_status,
            notes: row.observacion,
        })
    }
}

/// Rows that fail to convert are logged and left out so one bad row does not
/// blank every view.
fn into_events(rows: Vec<AccessEventRow>) -> Vec<AccessEvent> {
    rows.into_iter()
        .filter_map(|row| match AccessEvent::try_from(row) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable access event row");
                None
            }
        })
        .collect()
}

pub struct MySqlAccessStore {
    pool: MySqlPool,
}

impl MySqlAccessStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_event(&self, id: u64) -> StoreResult<AccessEvent> {
        let sql = format!("SELECT {} FROM access_events WHERE id = ?", EVENT_COLUMNS);
        let row = sqlx::query_as::<_, AccessEventRow>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(AccessEvent::try_from(row)?)
    }
}

#[async_trait]
impl AccessStore for MySqlAccessStore {
    async fn find_person(&self, cedula: &str) -> StoreResult<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(
            r#"
            SELECT cedula, nombres
            FROM personnel
            WHERE cedula = ?
            LIMIT 1
            "#,
        )
        .bind(cedula)
        .fetch_optional(&self.pool)
        .await?;

        Ok(person)
    }

    async fn list_personnel(&self) -> StoreResult<Vec<Person>> {
        let personnel = sqlx::query_as::<_, Person>(
            r#"
            SELECT cedula, nombres
            FROM personnel
            ORDER BY nombres
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(personnel)
    }

    async fn insert_person(&self, person: Person) -> StoreResult<Person> {
        let result = sqlx::query("INSERT INTO personnel (cedula, nombres) VALUES (?, ?)")
            .bind(&person.cedula)
            .bind(&person.name)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                debug!(cedula = %person.cedula, "Inserted person");
                Ok(person)
            }
            Err(e) if AccessError::is_integrity_violation(&e) => {
                Err(AccessError::conflict("La cédula ya está registrada"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_person(&self, cedula: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM personnel WHERE cedula = ?")
            .bind(cedula)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            // fk_access_events_personnel
            Err(e) if AccessError::is_integrity_violation(&e) => Err(AccessError::conflict(
                "El empleado tiene registros de acceso",
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn open_event(&self, cedula: &str, date: NaiveDate) -> StoreResult<Option<AccessEvent>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM access_events
            WHERE cedula = ?
            AND fecha = ?
            AND hora_salida IS NULL
            ORDER BY id DESC
            LIMIT 1
            "#,
            EVENT_COLUMNS
        );

        sqlx::query_as::<_, AccessEventRow>(&sql)
            .bind(cedula)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?
            .map(AccessEvent::try_from)
            .transpose()
            .map_err(AccessError::from)
    }

    async fn last_open_area(&self, cedula: &str) -> StoreResult<Option<WorkArea>> {
        let area = sqlx::query_scalar::<_, String>(
            r#"
            SELECT lugar_trabajo
            FROM access_events
            WHERE cedula = ?
            AND hora_salida IS NULL
            ORDER BY fecha DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(cedula)
        .fetch_optional(&self.pool)
        .await?;

        // A value outside the enumeration behaves like "no prior area".
        Ok(area.and_then(|a| match WorkArea::from_str(&a) {
            Ok(area) => Some(area),
            Err(_) => {
                warn!(cedula, area = %a, "Ignoring unknown stored work area");
                None
            }
        }))
    }

    async fn insert_entry(&self, entry: NewEntry) -> StoreResult<AccessEvent> {
        let result = sqlx::query(
            r#"
            INSERT INTO access_events
                (cedula, nombre, fecha, hora_entrada, lugar_trabajo, estado_salud, observacion)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.employee_id)
        .bind(&entry.employee_name)
        .bind(entry.date)
        .bind(entry.entry_time)
        .bind(entry.work_area.as_ref())
        .bind(entry.health_status.as_ref())
        .bind(&entry.notes)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        debug!(id, cedula = %entry.employee_id, "Inserted access entry");

        self.fetch_event(id).await
    }

    async fn close_event(&self, id: u64, update: ExitUpdate) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE access_events
            SET hora_salida = ?, estado_salud = ?, observacion = ?
            WHERE id = ?
            AND hora_salida IS NULL
            "#,
        )
        .bind(update.exit_time)
        .bind(update.health_status.as_ref())
        .bind(&update.notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_events(&self) -> StoreResult<Vec<AccessEvent>> {
        let sql = format!(
            "SELECT {} FROM access_events ORDER BY fecha DESC, id DESC",
            EVENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, AccessEventRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(into_events(rows))
    }

    async fn search_events(
        &self,
        cedula: Option<&str>,
        name: Option<&str>,
    ) -> StoreResult<Vec<AccessEvent>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<String> = Vec::new();

        if let Some(cedula) = cedula {
            where_sql.push_str(" AND cedula = ?");
            args.push(cedula.to_string());
        }

        if let Some(name) = name {
            where_sql.push_str(" AND LOWER(nombre) LIKE ?");
            args.push(format!("%{}%", name.to_lowercase()));
        }

        let sql = format!(
            "SELECT {} FROM access_events{} ORDER BY fecha DESC, id DESC",
            EVENT_COLUMNS, where_sql
        );
        debug!(sql = %sql, args = ?args, "Searching access events");

        let mut query = sqlx::query_as::<_, AccessEventRow>(&sql);
        for arg in args {
            query = query.bind(arg);
        }

        Ok(into_events(query.fetch_all(&self.pool).await?))
    }

    async fn delete_event(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM access_events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
