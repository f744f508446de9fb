mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod state;
mod utils;

#[cfg(test)]
mod test_support;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{Config, ErrorMode};
use crate::database::{MongoCatalogStore, MongoOrderLedger, MongoUserDirectory};
use crate::services::{CloudinaryImageHost, SmtpMailer};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ Invalid configuration: {}", e);
        io::Error::other(e.to_string())
    })?;

    log::info!("🚀 Starting Storefront Service...");
    log::info!(
        "⚙️  Error mode: {}",
        match config.error_mode {
            ErrorMode::Verbose => "verbose",
            ErrorMode::Terse => "terse",
        }
    );

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("❌ Failed to connect to MongoDB: {}", e);
            io::Error::other(e.to_string())
        })?;

    log::info!("✅ MongoDB connected successfully");

    let mailer = SmtpMailer::new(&config.smtp).map_err(|e| io::Error::other(e.to_string()))?;

    let state = AppState::new(
        Arc::new(MongoUserDirectory::new(&db)),
        Arc::new(MongoCatalogStore::new(&db)),
        Arc::new(MongoOrderLedger::new(&db)),
        Arc::new(CloudinaryImageHost::new(config.cloudinary.clone())),
        Arc::new(mailer),
        config.auth.clone(),
        config.default_avatar_url.clone(),
    );

    let state_data = web::Data::new(state);
    let db_data = web::Data::new(db);
    let error_mode = config.error_mode;
    let cors_origins = config.cors_origins.clone();

    log::info!("🌐 Server starting on {}:{}", config.host, config.port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", config.host, config.port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", config.host, config.port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state_data.clone())
            .app_data(db_data.clone())
            .wrap(middleware::ErrorTranslator::new(error_mode))
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            .configure(api::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
