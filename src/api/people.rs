use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    model::{access_event::AccessEvent, work_area::WorkArea},
    service::directory,
    store::AccessStore,
    utils::name_cache::NameCache,
};

#[derive(Deserialize, IntoParams)]
pub struct CedulaQuery {
    /// National identification number
    #[serde(default)]
    pub cedula: String,
}

#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    /// Exact cédula
    pub cedula: Option<String>,
    /// Name fragment, case-insensitive
    pub nombres: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct NameResponse {
    #[schema(example = "Ana Ruiz")]
    pub nombre: String,
}

#[derive(Serialize, ToSchema)]
pub struct AreaResponse {
    #[schema(example = "Mina Norte", nullable = true)]
    pub area: Option<WorkArea>,
}

/// Resolve a person's full name by cédula
#[utoipa::path(
    get,
    path = "/api/v1/people/by-id",
    params(CedulaQuery),
    responses(
        (status = 200, description = "Person found", body = NameResponse),
        (status = 404, description = "Unknown cédula", body = Object, example = json!({
            "error": "Empleado no encontrado"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "People"
)]
pub async fn name_by_cedula(
    store: web::Data<dyn AccessStore>,
    cache: web::Data<NameCache>,
    query: web::Query<CedulaQuery>,
) -> actix_web::Result<HttpResponse> {
    let nombre = directory::resolve_name(store.get_ref(), &cache, &query.cedula).await?;
    Ok(HttpResponse::Ok().json(NameResponse { nombre }))
}

/// Work area of the person's latest entry still waiting for its exit.
/// `area` is null when there is none.
#[utoipa::path(
    get,
    path = "/api/v1/people/last-area",
    params(CedulaQuery),
    responses(
        (status = 200, description = "Prior work area, possibly null", body = AreaResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "People"
)]
pub async fn last_area(
    store: web::Data<dyn AccessStore>,
    query: web::Query<CedulaQuery>,
) -> actix_web::Result<HttpResponse> {
    let area = directory::resolve_prior_area(store.get_ref(), &query.cedula).await?;
    Ok(HttpResponse::Ok().json(AreaResponse { area }))
}

/// Access events filtered by cédula and/or name fragment
#[utoipa::path(
    get,
    path = "/api/v1/people/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching access events", body = Vec<AccessEvent>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "People"
)]
pub async fn search(
    store: web::Data<dyn AccessStore>,
    query: web::Query<SearchQuery>,
) -> actix_web::Result<HttpResponse> {
    let cedula = query.cedula.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let nombres = query.nombres.as_deref().map(str::trim).filter(|n| !n.is_empty());

    let events = store.search_events(cedula, nombres).await?;
    Ok(HttpResponse::Ok().json(events))
}
