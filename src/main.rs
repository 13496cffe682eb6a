use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod service;
mod store;
mod utils;

use config::{Config, StorageBackend};
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::recorder::{Clock, LocalClock};
use crate::store::{AccessStore, MemoryAccessStore, MySqlAccessStore};
use crate::utils::name_cache::NameCache;
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Mine access control"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "access.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!("Server starting...");

    let store: Arc<dyn AccessStore> = match config.storage {
        StorageBackend::MySql => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORAGE=mysql")?;
            let pool = init_db(url)
                .await
                .context("Failed to connect to database")?;
            Arc::new(MySqlAccessStore::new(pool))
        }
        StorageBackend::Memory => {
            warn!(
                personnel = config.memory_personnel.len(),
                "Using in-memory storage; records are lost on restart"
            );
            Arc::new(MemoryAccessStore::with_personnel(
                config.memory_personnel.iter().cloned(),
            ))
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(LocalClock);
    let name_cache = NameCache::new(
        config.name_cache_capacity,
        Duration::from_secs(config.name_cache_ttl_secs),
    );

    let server_addr = config.server_addr.clone();
    info!(addr = %server_addr, storage = ?config.storage, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::from(store.clone()))
            .app_data(Data::from(clock.clone()))
            .app_data(Data::new(name_cache.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
