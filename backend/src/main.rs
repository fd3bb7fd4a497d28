mod cache;
mod config;
mod routes;
mod scan;
mod vision;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use cache::session_store::SessionStore;
use config::ScannerConfig;
use routes::configure_routes;
use scan::service::ScanService;
use std::env;
use std::sync::Arc;
use vision::client::GeminiClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let frontend_dir = if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../frontend/dist", manifest_dir)
    } else {
        "/usr/src/app/frontend/dist".to_string()
    };

    dotenv::dotenv().ok();

    let config = match ScannerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Failed to load scanner config ({e}); using built-in defaults");
            ScannerConfig::default()
        }
    };

    // The credential is only checked for presence; a bad key surfaces as a
    // failed scan at request time.
    let api_key = env::var("GEMINI_API_KEY").unwrap_or_default();
    let key_configured = !api_key.is_empty() && !api_key.contains("your_gemini");
    if key_configured {
        log::info!("Recognition credential detected (model: {})", config.model);
    } else {
        log::warn!(
            "GEMINI_API_KEY is not set. Scans will fail until it is provided via the environment or a .env file."
        );
    }

    let recognizer = GeminiClient::new(api_key, config.model.clone(), config.endpoint.clone());
    let scan_service = ScanService::new(
        SessionStore::new(),
        Arc::new(recognizer),
        config.max_upload_bytes,
    );

    let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .allowed_header(routes::SESSION_HEADER)
                    .max_age(3600),
            )
            .app_data(web::Data::new(scan_service.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
