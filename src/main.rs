use actix_governor::Governor;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod config;
mod dashboard;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod store;
mod validation;

use config::Config;

use crate::docs::ApiDoc;
use serde_json::json;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "OK",
        "message": "HRMS Lite API is running"
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        addr = %config.server_addr,
        backend = %config.store_backend,
        "Server starting..."
    );

    let store = Data::from(store::connect(&config).await?);
    let governor_conf = routes::rate_limiter(config.rate_per_min)?;
    let cors_origin = config.cors_origin.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Governor::new(&governor_conf))
            .wrap(routes::cors(&cors_origin))
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .service(index)
            .configure(routes::configure)
    })
    .bind(config.server_addr.as_str())
    .with_context(|| format!("Failed to bind {}", config.server_addr))?
    .run()
    .await?;

    Ok(())
}
