mod config;
mod errors;
mod handlers;
mod models;
mod services;
mod store;
mod utils;

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use crate::config::{Config, StorageBackend};
use crate::services::ledger::Ledger;
use crate::store::{ActivityStore, MemoryStore, PgStore};
use crate::utils::jwt::JwtSecret;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize the activity store
    let store: Arc<dyn ActivityStore> = match &config.storage {
        StorageBackend::Postgres(db) => {
            let store = PgStore::connect(db).await.map_err(to_io_error)?;
            store.migrate().await.map_err(to_io_error)?;
            info!("Connected to PostgreSQL");
            Arc::new(store)
        }
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    let ledger = web::Data::new(Ledger::new(store));
    let jwt_secret = web::Data::new(JwtSecret(config.jwt_secret.clone()));

    // Set up Prometheus metrics
    let mut labels = HashMap::new();
    labels.insert("app".to_string(), "timeflow".to_string());
    let prometheus = PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .const_labels(labels)
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    info!("Starting server at {} with {} workers", config.bind_address, config.workers);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(prometheus.clone())
            .app_data(ledger.clone())
            .app_data(jwt_secret.clone())
            .configure(handlers::configure)
    })
    .workers(config.workers)
    .bind(&config.bind_address)?
    .run()
    .await
}

fn to_io_error(err: errors::AppError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}
