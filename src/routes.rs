use crate::{
    api::{access_events, people, personnel},
    auth::middleware::auth_middleware,
    config::Config,
    error::AccessError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Malformed bodies, query strings and path segments get the same
    // `{"error": ...}` shape as every other failure.
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AccessError::validation(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| AccessError::validation(err.to_string()).into());
    let path_config = web::PathConfig::default()
        .error_handler(|err, _req| AccessError::validation(err.to_string()).into());

    cfg.service(
        web::scope(&config.api_prefix)
            .app_data(json_config)
            .app_data(query_config)
            .app_data(path_config)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/access-events")
                    // /access-events
                    .service(web::resource("").route(web::get().to(access_events::list_events)))
                    // /access-events/register
                    .service(
                        web::resource("/register")
                            .route(web::post().to(access_events::register_access)),
                    )
                    // /access-events/view
                    .service(
                        web::resource("/view").route(web::get().to(access_events::view_events)),
                    )
                    // /access-events/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(access_events::delete_event)),
                    ),
            )
            .service(
                web::scope("/people")
                    .service(web::resource("/by-id").route(web::get().to(people::name_by_cedula)))
                    .service(web::resource("/last-area").route(web::get().to(people::last_area)))
                    .service(web::resource("/search").route(web::get().to(people::search))),
            )
            .service(
                web::scope("/personnel")
                    // /personnel
                    .service(
                        web::resource("")
                            .route(web::get().to(personnel::list_personnel))
                            .route(web::post().to(personnel::create_person)),
                    )
                    // /personnel/{cedula}
                    .service(
                        web::resource("/{cedula}")
                            .route(web::delete().to(personnel::delete_person)),
                    ),
            ),
    );
}
