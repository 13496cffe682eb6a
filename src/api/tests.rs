use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, test};
use serde_json::{Value, json};

use crate::{
    auth::jwt::tests::mint,
    config::{Config, StorageBackend},
    model::person::Person,
    routes,
    service::recorder::{Clock, tests::FixedClock},
    store::{AccessStore, MemoryAccessStore},
    utils::name_cache::NameCache,
};

const SECRET: &str = "test-secret";
const ADMIN: u8 = 1;
const SUPERVISOR: u8 = 2;

fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        storage: StorageBackend::Memory,
        database_url: None,
        jwt_secret: SECRET.into(),
        api_prefix: "/api/v1".into(),
        rate_protected_per_min: 100_000,
        name_cache_capacity: 100,
        name_cache_ttl_secs: 60,
        log_dir: "logs".into(),
        memory_personnel: Vec::new(),
    }
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn bearer(role: u8) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", mint(role, SECRET, 600)))
}

fn personnel() -> Arc<dyn AccessStore> {
    Arc::new(MemoryAccessStore::with_personnel([
        Person::new("123456789", "Ana Ruiz"),
        Person::new("987654321", "Luis Mora"),
    ]))
}

macro_rules! app {
    ($store:expr, $clock:expr) => {{
        let config = test_config();
        let clock: Arc<dyn Clock> = $clock;
        test::init_service(
            App::new()
                .wrap(NormalizePath::trim())
                .app_data(Data::from($store))
                .app_data(Data::from(clock))
                .app_data(Data::new(NameCache::new(100, Duration::from_secs(60))))
                .app_data(Data::new(config.clone()))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

fn register_body(cedula: &str, nombre: &str, health: &str, area: &str) -> Value {
    json!({
        "cedula": cedula,
        "nombre": nombre,
        "estado_salud": health,
        "lugar_trabajo": area,
        "observacion": null
    })
}

macro_rules! post_register {
    ($app:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/v1/access-events/register/")
            .peer_addr(peer())
            .insert_header(bearer(SUPERVISOR))
            .set_json($body)
            .to_request();
        test::call_service(&$app, req).await
    }};
}

macro_rules! get_json {
    ($app:expr, $uri:expr) => {{
        let req = test::TestRequest::get()
            .uri($uri)
            .peer_addr(peer())
            .insert_header(bearer(SUPERVISOR))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {}", $uri);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

fn ids(rows: &Value) -> Vec<u64> {
    rows.as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect()
}

#[actix_web::test]
async fn entry_then_exit_moves_record_through_views() {
    let clock = Arc::new(FixedClock::at(7, 2));
    let app = app!(personnel(), clock.clone());

    let resp = post_register!(
        app,
        register_body("123456789", "Ana Ruiz", "Bien", "Mina Norte")
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "entrada");
    assert!(body["detail"].as_str().unwrap().starts_with("Entrada"));
    let id = body["id"].as_u64().unwrap();

    let all = get_json!(app, "/api/v1/access-events/view/?lens=all");
    assert_eq!(ids(&all), vec![id]);
    assert_eq!(all[0]["entry_time"], "07:02");
    assert_eq!(all[0]["exit_time"], "-");
    assert_eq!(all[0]["date"], "02/03/2026");

    let entries = get_json!(app, "/api/v1/access-events/view/?lens=entries");
    assert_eq!(ids(&entries), vec![id]);
    let exits = get_json!(app, "/api/v1/access-events/view/?lens=exits");
    assert!(exits.as_array().unwrap().is_empty());

    // Exit later the same day, area left as the one the directory suggests.
    let area = get_json!(app, "/api/v1/people/last-area/?cedula=123456789");
    assert_eq!(area["area"], "Mina Norte");

    clock.set(16, 45);
    let resp = post_register!(
        app,
        register_body("123456789", "Ana Ruiz", "Regular", "Mina Norte")
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["kind"], "salida");
    assert_eq!(body["id"].as_u64(), Some(id));

    let exits = get_json!(app, "/api/v1/access-events/view/?lens=exits");
    assert_eq!(ids(&exits), vec![id]);
    assert_eq!(exits[0]["exit_time"], "16:45");
    assert!(exits[0].get("entry_time").is_none());

    let all = get_json!(app, "/api/v1/access-events/view");
    assert_eq!(all[0]["entry_time"], "07:02");
    assert_eq!(all[0]["exit_time"], "16:45");

    let events = get_json!(app, "/api/v1/access-events/");
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["health_status"], "Regular");

    let area = get_json!(app, "/api/v1/people/last-area/?cedula=123456789");
    assert!(area["area"].is_null());
}

#[actix_web::test]
async fn unknown_cedula_lookup_is_not_found() {
    let app = app!(personnel(), Arc::new(FixedClock::at(7, 0)));

    let req = test::TestRequest::get()
        .uri("/api/v1/people/by-id/?cedula=000000000")
        .peer_addr(peer())
        .insert_header(bearer(SUPERVISOR))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Empleado no encontrado");

    let found = get_json!(app, "/api/v1/people/by-id/?cedula=987654321");
    assert_eq!(found["nombre"], "Luis Mora");
}

#[actix_web::test]
async fn invalid_submissions_leave_log_untouched() {
    let app = app!(personnel(), Arc::new(FixedClock::at(7, 0)));

    let resp = post_register!(
        app,
        register_body("123456789", "Ana Ruiz", "Excelente", "Mina Norte")
    );
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("estado_salud"));

    let resp = post_register!(app, json!({ "cedula": "123456789" }));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = post_register!(
        app,
        register_body("000000000", "Nadie", "Bien", "Mina Sur")
    );
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/v1/access-events/register")
        .peer_addr(peer())
        .insert_header(bearer(SUPERVISOR))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body.get("error").is_some());

    let events = get_json!(app, "/api/v1/access-events");
    assert!(events.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn delete_removes_event_from_every_view() {
    let clock = Arc::new(FixedClock::at(6, 30));
    let app = app!(personnel(), clock.clone());

    post_register!(app, register_body("123456789", "Ana Ruiz", "Bien", "Mina Norte"));
    clock.set(14, 0);
    let resp = post_register!(app, register_body("123456789", "Ana Ruiz", "Bien", "Mina Norte"));
    let id = test::read_body_json::<Value, _>(resp).await["id"]
        .as_u64()
        .unwrap();

    let uri = format!("/api/v1/access-events/{}/", id);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .peer_addr(peer())
        .insert_header(bearer(SUPERVISOR))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::delete()
        .uri(&uri)
        .peer_addr(peer())
        .insert_header(bearer(ADMIN))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    for lens in ["all", "entries", "exits"] {
        let rows = get_json!(app, &format!("/api/v1/access-events/view?lens={}", lens));
        assert!(rows.as_array().unwrap().is_empty(), "lens {}", lens);
    }

    let req = test::TestRequest::delete()
        .uri(&uri)
        .peer_addr(peer())
        .insert_header(bearer(ADMIN))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn search_result_replaces_full_log_in_views() {
    let app = app!(personnel(), Arc::new(FixedClock::at(7, 0)));

    post_register!(app, register_body("123456789", "Ana Ruiz", "Bien", "Mina Norte"));
    post_register!(app, register_body("987654321", "Luis Mora", "Mal", "Mantenimiento"));

    let found = get_json!(app, "/api/v1/people/search/?nombres=mora");
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["employee_id"], "987654321");

    let rows = get_json!(app, "/api/v1/access-events/view?lens=entries&cedula=123456789");
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["employee_name"], "Ana Ruiz");

    let rows = get_json!(app, "/api/v1/access-events/view?q=mantenimiento");
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["work_area"], "Mantenimiento");
}

#[actix_web::test]
async fn requests_without_valid_token_are_rejected() {
    let app = app!(personnel(), Arc::new(FixedClock::at(7, 0)));

    let req = test::TestRequest::get()
        .uri("/api/v1/access-events")
        .peer_addr(peer())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/access-events")
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {}", mint(1, "wrong", 600))))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/access-events")
        .peer_addr(peer())
        .insert_header(bearer(9))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn every_failure_body_carries_an_error_message() {
    let clock = Arc::new(FixedClock::at(7, 0));
    let app = app!(personnel(), clock.clone());

    let resp = post_register!(app, register_body("123456789", "Ana Ruiz", "Bien", "Mina Norte"));
    let id = test::read_body_json::<Value, _>(resp).await["id"]
        .as_u64()
        .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/access-events/{}", id))
        .peer_addr(peer())
        .insert_header(bearer(SUPERVISOR))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Admin only");

    for (uri, status) in [
        ("/api/v1/access-events/view?lens=bogus", StatusCode::BAD_REQUEST),
        ("/api/v1/access-events/view?fecha=31/02/2026", StatusCode::BAD_REQUEST),
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .peer_addr(peer())
            .insert_header(bearer(SUPERVISOR))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "GET {}", uri);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string(), "GET {}", uri);
    }

    let req = test::TestRequest::delete()
        .uri("/api/v1/access-events/not-a-number")
        .peer_addr(peer())
        .insert_header(bearer(ADMIN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let req = test::TestRequest::get()
        .uri("/api/v1/access-events")
        .peer_addr(peer())
        .insert_header(("Authorization", "Token abc"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Authorization header must start with Bearer");
}

#[actix_web::test]
async fn view_narrows_to_a_displayed_date() {
    let clock = Arc::new(FixedClock::at(7, 0));
    let app = app!(personnel(), clock.clone());

    post_register!(app, register_body("123456789", "Ana Ruiz", "Bien", "Mina Norte"));
    clock.next_day();
    post_register!(app, register_body("987654321", "Luis Mora", "Bien", "Mina Sur"));

    let rows = get_json!(app, "/api/v1/access-events/view?fecha=03/03/2026");
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["employee_name"], "Luis Mora");
    assert_eq!(rows[0]["date"], "03/03/2026");

    let rows = get_json!(app, "/api/v1/access-events/view?fecha=01/03/2026");
    assert!(rows.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn admin_maintains_directory_used_by_the_gate() {
    let app = app!(
        Arc::new(MemoryAccessStore::default()) as Arc<dyn AccessStore>,
        Arc::new(FixedClock::at(7, 0))
    );

    let new_person = json!({ "cedula": "555", "nombres": "Rosa Vega" });

    let req = test::TestRequest::post()
        .uri("/api/v1/personnel")
        .peer_addr(peer())
        .insert_header(bearer(SUPERVISOR))
        .set_json(&new_person)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/personnel/")
        .peer_addr(peer())
        .insert_header(bearer(ADMIN))
        .set_json(&new_person)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "cedula": "555", "nombres": "Rosa Vega" }));

    let req = test::TestRequest::post()
        .uri("/api/v1/personnel")
        .peer_addr(peer())
        .insert_header(bearer(ADMIN))
        .set_json(&new_person)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let listed = get_json!(app, "/api/v1/personnel");
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let found = get_json!(app, "/api/v1/people/by-id?cedula=555");
    assert_eq!(found["nombre"], "Rosa Vega");

    let resp = post_register!(app, register_body("555", "Rosa Vega", "Bien", "Procesamiento"));
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri("/api/v1/personnel/555")
        .peer_addr(peer())
        .insert_header(bearer(ADMIN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    let events = get_json!(app, "/api/v1/access-events");
    let event_id = events[0]["id"].as_u64().unwrap();
    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/access-events/{}", event_id))
        .peer_addr(peer())
        .insert_header(bearer(ADMIN))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::delete()
        .uri("/api/v1/personnel/555")
        .peer_addr(peer())
        .insert_header(bearer(ADMIN))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri("/api/v1/people/by-id?cedula=555")
        .peer_addr(peer())
        .insert_header(bearer(SUPERVISOR))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}
