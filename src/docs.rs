use crate::api::people::{AreaResponse, NameResponse};
use crate::model::{
    access_event::AccessEvent, health_status::HealthStatus, person::Person, work_area::WorkArea,
};
use crate::service::directory::NewPerson;
use crate::service::projection::{DisplayRow, Lens};
use crate::service::recorder::{AccessKind, Recorded, RegisterAccess};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mine Access Control API",
        version = "1.0.0",
        description = r#"
## Mine access control

Gate log for mining operations: who entered which work front, when they
left, and how they reported feeling at each end of the shift.

### Key Features
- **Entry / exit recording**
  - One endpoint; the first submission of the day opens an event, the next closes it
- **Directory lookup**
  - Resolve a name and the pending work area from a cédula
- **Log views**
  - All, entries-only and exits-only projections with free-text filtering

- **Personnel directory**
  - Register and remove the people allowed through the gate

### Security
Every endpoint requires a **JWT Bearer** token. Deleting an event and
changing the personnel directory are restricted to the **Admin** role.
"#,
    ),
    paths(
        crate::api::access_events::list_events,
        crate::api::access_events::register_access,
        crate::api::access_events::delete_event,
        crate::api::access_events::view_events,

        crate::api::people::name_by_cedula,
        crate::api::people::last_area,
        crate::api::people::search,

        crate::api::personnel::list_personnel,
        crate::api::personnel::create_person,
        crate::api::personnel::delete_person
    ),
    components(
        schemas(
            AccessEvent,
            WorkArea,
            HealthStatus,
            RegisterAccess,
            Recorded,
            AccessKind,
            DisplayRow,
            Lens,
            NameResponse,
            AreaResponse,
            Person,
            NewPerson
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Access", description = "Entry/exit recording and log views"),
        (name = "People", description = "Directory lookups by cédula"),
        (name = "Personnel", description = "Directory maintenance"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
