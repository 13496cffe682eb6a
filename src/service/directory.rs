use serde::Deserialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::{
    error::AccessError,
    model::{person::Person, work_area::WorkArea},
    store::AccessStore,
    utils::name_cache::NameCache,
};

/// Directory registration payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NewPerson {
    #[serde(default)]
    #[schema(example = "123456789")]
    pub cedula: String,
    #[serde(default)]
    #[schema(example = "Ana Ruiz")]
    pub nombres: String,
}

fn normalize_cedula(cedula: &str) -> Result<&str, AccessError> {
    let cedula = cedula.trim();
    if cedula.is_empty() {
        return Err(AccessError::validation("cedula is required"));
    }
    Ok(cedula)
}

/// Resolves the full name registered for a cédula.
pub async fn resolve_name(
    store: &dyn AccessStore,
    cache: &NameCache,
    cedula: &str,
) -> Result<String, AccessError> {
    let cedula = normalize_cedula(cedula)?;

    if let Some(name) = cache.get(cedula).await {
        debug!(cedula, "Name cache hit");
        return Ok(name);
    }

    let person = store
        .find_person(cedula)
        .await?
        .ok_or_else(|| AccessError::not_found("Empleado no encontrado"))?;

    cache.insert(cedula, &person.name).await;
    Ok(person.name)
}

/// Work area of the person's latest entry that still lacks an exit.
/// `None` is a normal answer: the caller leaves the area for manual choice.
pub async fn resolve_prior_area(
    store: &dyn AccessStore,
    cedula: &str,
) -> Result<Option<WorkArea>, AccessError> {
    let cedula = normalize_cedula(cedula)?;
    store.last_open_area(cedula).await
}

pub async fn register_person(
    store: &dyn AccessStore,
    new: &NewPerson,
) -> Result<Person, AccessError> {
    let cedula = normalize_cedula(&new.cedula)?;
    let name = new.nombres.trim();
    if name.is_empty() {
        return Err(AccessError::validation("nombres is required"));
    }

    let person = store.insert_person(Person::new(cedula, name)).await?;
    info!(cedula = %person.cedula, "Person registered");
    Ok(person)
}

/// Removes a person from the directory and drops any cached name for them.
pub async fn remove_person(
    store: &dyn AccessStore,
    cache: &NameCache,
    cedula: &str,
) -> Result<(), AccessError> {
    let cedula = normalize_cedula(cedula)?;
    if !store.delete_person(cedula).await? {
        return Err(AccessError::not_found("Empleado no encontrado"));
    }

    cache.invalidate(cedula).await;
    info!(cedula, "Person removed");
    Ok(())
}
