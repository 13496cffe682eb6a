use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::AccessError,
    model::{
        access_event::{AccessEvent, ExitUpdate, NewEntry},
        person::Person,
        work_area::WorkArea,
    },
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryAccessStore;
pub use mysql::MySqlAccessStore;

pub type StoreResult<T> = Result<T, AccessError>;

/// Persistence seam for personnel lookups and access events.
#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn find_person(&self, cedula: &str) -> StoreResult<Option<Person>>;

    /// Directory ordered by name.
    async fn list_personnel(&self) -> StoreResult<Vec<Person>>;

    /// Conflict when the cédula is already registered.
    async fn insert_person(&self, person: Person) -> StoreResult<Person>;

    /// Returns false for an unknown cédula; Conflict while access events
    /// still reference the person.
    async fn delete_person(&self, cedula: &str) -> StoreResult<bool>;

    /// Most recent event for `cedula` on `date` that has no exit yet.
    async fn open_event(&self, cedula: &str, date: NaiveDate) -> StoreResult<Option<AccessEvent>>;

    /// Work area of the most recent event, on any date, still missing its exit.
    async fn last_open_area(&self, cedula: &str) -> StoreResult<Option<WorkArea>>;

    async fn insert_entry(&self, entry: NewEntry) -> StoreResult<AccessEvent>;

    /// Returns false when the event is gone or already closed.
    async fn close_event(&self, id: u64, update: ExitUpdate) -> StoreResult<bool>;

    /// Every event, newest first.
    async fn list_events(&self) -> StoreResult<Vec<AccessEvent>>;

    /// `cedula` matches exactly, `name` as a case-insensitive fragment.
    async fn search_events(
        &self,
        cedula: Option<&str>,
        name: Option<&str>,
    ) -> StoreResult<Vec<AccessEvent>>;

    async fn delete_event(&self, id: u64) -> StoreResult<bool>;
}
