use actix_web::{HttpResponse, web};
use tracing::{debug, info};

use crate::{
    auth::auth::AuthUser,
    error::AccessError,
    model::access_event::AccessEvent,
    service::{
        projection::{self, DisplayRow, ViewQuery},
        recorder::{self, Clock, Recorded, RegisterAccess},
    },
    store::AccessStore,
};

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// List every access event, newest first
#[utoipa::path(
    get,
    path = "/api/v1/access-events",
    responses(
        (status = 200, description = "All access events", body = Vec<AccessEvent>),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Storage unavailable")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Access"
)]
pub async fn list_events(store: web::Data<dyn AccessStore>) -> actix_web::Result<HttpResponse> {
    let events = store.list_events().await?;
    Ok(HttpResponse::Ok().json(events))
}

/// Register an entry or exit. The first submission of the day opens an
/// event, the next one closes it.
#[utoipa::path(
    post,
    path = "/api/v1/access-events/register",
    request_body = RegisterAccess,
    responses(
        (status = 200, description = "Entry or exit recorded", body = Recorded, example = json!({
            "detail": "Entrada registrada correctamente",
            "kind": "entrada",
            "id": 1
        })),
        (status = 400, description = "Missing or invalid field", body = Object, example = json!({
            "error": "estado_salud is required"
        })),
        (status = 404, description = "Unknown cédula", body = Object, example = json!({
            "error": "Empleado no encontrado"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Access"
)]
pub async fn register_access(
    store: web::Data<dyn AccessStore>,
    clock: web::Data<dyn Clock>,
    payload: web::Json<RegisterAccess>,
) -> actix_web::Result<HttpResponse> {
    let recorded = recorder::record_access(store.get_ref(), clock.get_ref(), &payload).await?;
    Ok(HttpResponse::Ok().json(recorded))
}

/// Delete an access event, entry and exit together (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/access-events/{id}",
    params(
        ("id" = u64, Path, description = "Access event id")
    ),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Access event not found", body = Object, example = json!({
            "error": "Registro no encontrado"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Access"
)]
pub async fn delete_event(
    auth: AuthUser,
    store: web::Data<dyn AccessStore>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    let id = path.into_inner();
    if !store.delete_event(id).await? {
        return Err(AccessError::not_found("Registro no encontrado").into());
    }

    info!(id, user_id = auth.user_id, user = %auth.username, "Access event deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Projected log rows for the dashboard tabs
#[utoipa::path(
    get,
    path = "/api/v1/access-events/view",
    params(ViewQuery),
    responses(
        (status = 200, description = "Rows for the selected lens", body = Vec<DisplayRow>),
        (status = 400, description = "Unknown lens or malformed fecha", body = Object, example = json!({
            "error": "Invalid fecha \"31/02/2026\", expected DD/MM/YYYY"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Access"
)]
pub async fn view_events(
    store: web::Data<dyn AccessStore>,
    query: web::Query<ViewQuery>,
) -> actix_web::Result<HttpResponse> {
    let cedula = non_blank(&query.cedula);
    let nombres = non_blank(&query.nombres);

    let day = non_blank(&query.fecha)
        .map(projection::parse_filter_date)
        .transpose()?;

    let mut events = if cedula.is_some() || nombres.is_some() {
        store.search_events(cedula, nombres).await?
    } else {
        store.list_events().await?
    };
    if let Some(day) = day {
        events.retain(|e| e.date == day);
    }

    let lens = query.lens.unwrap_or_default();
    let rows = projection::project(&events, lens);
    let rows = match query.q.as_deref() {
        Some(term) => projection::filter_rows(rows, term),
        None => rows,
    };

    debug!(?lens, rows = rows.len(), "Projected access log");
    Ok(HttpResponse::Ok().json(rows))
}
