use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{AccessStore, StoreResult};
use crate::{
    error::AccessError,
    model::{
        access_event::{AccessEvent, ExitUpdate, NewEntry},
        person::Person,
        work_area::WorkArea,
    },
};

#[derive(Default)]
struct Tables {
    personnel: Vec<Person>,
    events: Vec<AccessEvent>,
    next_id: u64,
}

/// Process-local store used for demos (`STORAGE=memory`) and tests.
#[derive(Default)]
pub struct MemoryAccessStore {
    tables: RwLock<Tables>,
}

impl MemoryAccessStore {
    pub fn with_personnel(personnel: impl IntoIterator<Item = Person>) -> Self {
        let store = Self::default();
        if let Ok(mut tables) = store.tables.write() {
            tables.personnel.extend(personnel);
        }
        store
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AccessError::Transport("memory store poisoned".into()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AccessError::Transport("memory store poisoned".into()))
    }
}

fn newest_first(events: &mut [AccessEvent]) {
    events.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl AccessStore for MemoryAccessStore {
    async fn find_person(&self, cedula: &str) -> StoreResult<Option<Person>> {
        Ok(self
            .read()?
            .personnel
            .iter()
            .find(|p| p.cedula == cedula)
            .cloned())
    }

    async fn list_personnel(&self) -> StoreResult<Vec<Person>> {
        let mut personnel = self.read()?.personnel.clone();
        personnel.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(personnel)
    }

    async fn insert_person(&self, person: Person) -> StoreResult<Person> {
        let mut tables = self.write()?;
        if tables.personnel.iter().any(|p| p.cedula == person.cedula) {
            return Err(AccessError::conflict("La cédula ya está registrada"));
        }
        tables.personnel.push(person.clone());
        Ok(person)
    }

    async fn delete_person(&self, cedula: &str) -> StoreResult<bool> {
        let mut tables = self.write()?;
        if tables.events.iter().any(|e| e.employee_id == cedula) {
            return Err(AccessError::conflict(
                "El empleado tiene registros de acceso",
            ));
        }
        let before = tables.personnel.len();
        tables.personnel.retain(|p| p.cedula != cedula);
        Ok(tables.personnel.len() != before)
    }

    async fn open_event(&self, cedula: &str, date: NaiveDate) -> StoreResult<Option<AccessEvent>> {
        Ok(self
            .read()?
            .events
            .iter()
            .filter(|e| e.employee_id == cedula && e.date == date && e.is_open())
            .max_by_key(|e| e.id)
            .cloned())
    }

    async fn last_open_area(&self, cedula: &str) -> StoreResult<Option<WorkArea>> {
        Ok(self
            .read()?
            .events
            .iter()
            .filter(|e| e.employee_id == cedula && e.is_open())
            .max_by_key(|e| (e.date, e.id))
            .map(|e| e.work_area))
    }

    async fn insert_entry(&self, entry: NewEntry) -> StoreResult<AccessEvent> {
        let mut tables = self.write()?;
        tables.next_id += 1;

        let event = AccessEvent {
            id: tables.next_id,
            employee_id: entry.employee_id,
            employee_name: entry.employee_name,
            date: entry.date,
            entry_time: Some(entry.entry_time),
            exit_time: None,
            work_area: entry.work_area,
            health_status: entry.health_status,
            notes: entry.notes,
        };
        tables.events.push(event.clone());
        Ok(event)
    }

    async fn close_event(&self, id: u64, update: ExitUpdate) -> StoreResult<bool> {
        let mut tables = self.write()?;
        match tables.events.iter_mut().find(|e| e.id == id && e.is_open()) {
            Some(event) => {
                event.exit_time = Some(update.exit_time);
                event.health_status = update.health_status;
                event.notes = update.notes;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_events(&self) -> StoreResult<Vec<AccessEvent>> {
        let mut events = self.read()?.events.clone();
        newest_first(&mut events);
        Ok(events)
    }

    async fn search_events(
        &self,
        cedula: Option<&str>,
        name: Option<&str>,
    ) -> StoreResult<Vec<AccessEvent>> {
        let fragment = name.map(str::to_lowercase);
        let mut events: Vec<AccessEvent> = self
            .read()?
            .events
            .iter()
            .filter(|e| cedula.is_none_or(|c| e.employee_id == c))
            .filter(|e| {
                fragment
                    .as_deref()
                    .is_none_or(|f| e.employee_name.to_lowercase().contains(f))
            })
            .cloned()
            .collect();
        newest_first(&mut events);
        Ok(events)
    }

    async fn delete_event(&self, id: u64) -> StoreResult<bool> {
        let mut tables = self.write()?;
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        Ok(tables.events.len() != before)
    }
}
