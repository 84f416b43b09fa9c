use actix_web::{web, HttpResponse, Responder};

use crate::cache;
use crate::db::HealthState;
use crate::errors::AppError;
use crate::types::{AppState, HealthStatus, ResponsePayload};

mod short_link;

// Handler function for the root route "/"
async fn index() -> impl Responder {
    let welcome_message = ResponsePayload {
        status: 200,
        message: String::from("Welcome! POST a URL to /api/v1/shorten to get a short link."),
    };

    HttpResponse::Ok().json(welcome_message)
}

// Handler function for the health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let db_health = data.db.health_check().await;
    let cache_health = cache::health_check(data.code_pool.as_ref()).await;

    // The pool is optional, so only the database decides overall health
    let (status, mut response) = if db_health.status == HealthState::Healthy {
        ("OK", HttpResponse::Ok())
    } else {
        ("DEGRADED", HttpResponse::ServiceUnavailable())
    };

    response.json(HealthStatus {
        status: status.to_string(),
        version: data.version.clone(),
        db_health,
        cache_health,
        uptime_seconds: data.start_time.elapsed().as_secs(),
    })
}

/// Malformed JSON bodies become validation errors with the usual error payload
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());
    cfg.route("/", web::get().to(index));
    cfg.route("/health", web::get().to(health_check));
    // Registers the catch-all redirect route, so it must come last
    short_link::configure_routes(cfg);
}
