use actix_web::{App, HttpServer};
use backend::config::{Config, LoggingConfig};
use backend::store::Store;
use backend::AppState;
use log::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let env_files = backend::config::load_env_files();
    if let Err(e) = backend::logging::init(&LoggingConfig::from_env()) {
        eprintln!("Failed to initialise logging: {:#}", e);
        return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
    for file in &env_files {
        info!("Loaded environment from {}", file);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    // Blocks until the ingestion process has produced the snapshot
    let store = match Store::wait_and_open(&config.database).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open snapshot {}: {}", config.database.path, e);
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()));
        }
    };

    let state = AppState::new(store.clone(), &config);

    info!("Starting server on {}:{}", config.server.host, config.server.port);

    let result = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(backend::middleware::Logger)
            .configure(move |cfg| backend::configure_app(cfg, &state))
            .default_service(backend::not_found_service())
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await;

    store.close().await;
    result
}
