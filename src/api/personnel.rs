use actix_web::{HttpResponse, web};

use crate::{
    auth::auth::AuthUser,
    model::person::Person,
    service::directory::{self, NewPerson},
    store::AccessStore,
    utils::name_cache::NameCache,
};

/// List the personnel directory, ordered by name
#[utoipa::path(
    get,
    path = "/api/v1/personnel",
    responses(
        (status = 200, description = "Registered personnel", body = Vec<Person>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Personnel"
)]
pub async fn list_personnel(store: web::Data<dyn AccessStore>) -> actix_web::Result<HttpResponse> {
    let personnel = store.list_personnel().await?;
    Ok(HttpResponse::Ok().json(personnel))
}

/// Register a person in the directory (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/personnel",
    request_body = NewPerson,
    responses(
        (status = 201, description = "Person registered", body = Person),
        (status = 400, description = "Missing field", body = Object, example = json!({
            "error": "nombres is required"
        })),
        (status = 409, description = "Cédula already registered", body = Object, example = json!({
            "error": "La cédula ya está registrada"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Personnel"
)]
pub async fn create_person(
    auth: AuthUser,
    store: web::Data<dyn AccessStore>,
    payload: web::Json<NewPerson>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    let person = directory::register_person(store.get_ref(), &payload).await?;
    Ok(HttpResponse::Created().json(person))
}

/// Remove a person from the directory (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/personnel/{cedula}",
    params(
        ("cedula" = String, Path, description = "National identification number")
    ),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Unknown cédula"),
        (status = 409, description = "Person still has access events", body = Object, example = json!({
            "error": "El empleado tiene registros de acceso"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Personnel"
)]
pub async fn delete_person(
    auth: AuthUser,
    store: web::Data<dyn AccessStore>,
    cache: web::Data<NameCache>,
    path: web::Path<String>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    directory::remove_person(store.get_ref(), &cache, &path).await?;
    Ok(HttpResponse::NoContent().finish())
}
