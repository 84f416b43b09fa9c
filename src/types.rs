use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheHealth, CodePool};
use crate::db::{Database, DatabaseHealth};
use crate::errors::AppError;

// Custom result type for request handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize, Deserialize)]
pub struct ResponsePayload {
    pub status: i32,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub db_health: DatabaseHealth,
    pub cache_health: CacheHealth,
    pub uptime_seconds: u64,
}

// Shared handles for the health endpoint
pub struct AppState {
    pub start_time: Instant,
    pub db: Database,
    pub code_pool: Arc<dyn CodePool>,
    pub version: String,
}
