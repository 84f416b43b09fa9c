use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{debug, info, warn};

use crate::{
    cache::{connect_code_pool, CodePool},
    config::{Config, Environment},
    db::Database,
    errors::AppError,
    middleware::RequestLogger,
    repositories::{PgShortLinkRepository, ShortLinkRepositoryTrait},
    routes,
    services::{CancelHandle, ClickRecorder, CodeGenerator, ShortLinkService},
    types::AppState,
};

// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;

/// Upper bound on waiting for queued clicks at shutdown
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

// Setup logging with custom format and configuration
fn setup_logging(config: &Config) -> AppResult<()> {
    let log_level = match config.app.environment {
        Environment::Development => config.app.log_level.clone(),
        Environment::Testing => "debug,actix_web=info".to_string(),
        Environment::Production => "info,actix_web=warn".to_string(),
    };

    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::try_init_from_env(env)
        .map_err(|e| AppError::Logger(format!("Failed to initialize logger: {}", e)))
}

pub async fn server() -> AppResult<()> {
    let config = Config::load()?;

    setup_logging(&config)?;

    let start_time = Instant::now();

    info!("Starting {} v{}", config.app.name, config.app.version);
    info!("Environment: {:?}", config.app.environment);
    info!(
        "Binding to {}:{} with {} workers",
        config.server.host, config.server.port, config.server.workers
    );

    if config.app.environment == Environment::Development {
        debug!("Full configuration: {:?}", config);
    }

    // Store handles live for the whole process and are closed explicitly below
    let db = Database::connect(&config.db).await?;
    let code_pool: Arc<dyn CodePool> = Arc::from(connect_code_pool(&config.cache).await);
    let repository: Arc<dyn ShortLinkRepositoryTrait> = Arc::new(PgShortLinkRepository::new(&db));

    let (clicks, click_recorder) = ClickRecorder::start(
        repository.clone(),
        config.links.store_timeout(),
    );

    let shutdown = Arc::new(CancelHandle::new());
    spawn_shutdown_listener(shutdown.clone());

    let service = web::Data::new(ShortLinkService::new(
        repository,
        CodeGenerator::new(code_pool.clone()),
        clicks,
        shutdown.clone(),
        config.links.clone(),
    ));

    let state = web::Data::new(AppState {
        start_time,
        db: db.clone(),
        code_pool,
        version: config.app.version.clone(),
    });

    let verbose = config.app.environment != Environment::Production;

    let log_format = if verbose {
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{X-Request-ID}o"
    } else {
        "%a \"%r\" %s %b %T"
    };

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(service.clone())
            .wrap(RequestLogger::new(verbose))
            .wrap(Logger::new(log_format))
            .wrap(Cors::permissive())
            .configure(routes::configure_routes)
    })
    .workers(config.server.workers)
    .bind((config.server.host.to_string(), config.server.port))?
    .run()
    .await?;

    info!("HTTP server stopped, releasing resources");
    shutdown.cancel();
    click_recorder.drain(CLICK_DRAIN_TIMEOUT).await;
    db.shutdown().await;

    info!("Shutdown complete");
    Ok(())
}

/// Cancels in-flight store calls once an interrupt arrives
fn spawn_shutdown_listener(shutdown: Arc<CancelHandle>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, cancelling outstanding store calls");
                shutdown.cancel();
            }
            Err(e) => warn!("Could not listen for shutdown signal: {}", e),
        }
    });
}
