use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use dotenv::dotenv;
use pinjamanku::{
    config::{config::Config, config_scope},
    database::db::Database,
    middleware::security_log::security_logger_middleware,
    service::storage::LocalStorage,
    AppState,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info,actix_web=info");
    }
    env_logger::init();
    log::info!("Starting Server......");

    let config = match Config::init() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db = match Database::new(&config) {
        Ok(db) => db,
        Err(e) => {
            log::error!("Failed to initialize DB: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db.run_migrations() {
        log::error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let state = web::Data::new(AppState {
        db: Arc::new(db),
        storage: Arc::new(LocalStorage::new(config.upload_dir.clone())),
        env: config.clone(),
    });

    log::info!("Listening on {}:{}", config.host, config.port);

    let cors_origin = config.cors_origin.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PATCH"])
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
            ])
            .supports_credentials();

        App::new()
            .app_data(state.clone())
            .configure(config_scope::config)
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(from_fn(security_logger_middleware))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
