use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{info, warn};
use redis::{aio::ConnectionManager, AsyncCommands, IntoConnectionInfo, RedisError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::CacheConfig;
use crate::db::HealthState;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Code pool connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("Code pool is disabled")]
    Disabled,
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Code pool health check result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheHealth {
    pub status: HealthState,
    pub response_time_ms: u64,
    pub message: Option<String>,
}

/// A shared FIFO of pre-generated short codes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodePool: Send + Sync {
    /// Pops the oldest code, `Ok(None)` when the pool is exhausted
    async fn pop_code(&self) -> CacheResult<Option<String>>;

    async fn ping(&self) -> CacheResult<()>;
}

/// Code pool backed by a Redis list.
///
/// The connection is established on first use and re-established after a
/// failed attempt, so a Redis outage at startup only costs pooled codes until
/// Redis comes back.
pub struct RedisCodePool {
    client: redis::Client,
    connection: RwLock<Option<ConnectionManager>>,
    connect_timeout: Duration,
    queue_name: String,
}

impl RedisCodePool {
    /// Builds the client, applying the password and database from configuration.
    /// No connection is made yet.
    pub fn new(config: &CacheConfig) -> CacheResult<Self> {
        let mut info = config.url.as_str().into_connection_info()?;
        if !config.password.is_empty() {
            info.redis.password = Some(config.password.clone());
        }
        info.redis.db = config.db;

        Ok(Self {
            client: redis::Client::open(info)?,
            connection: RwLock::new(None),
            connect_timeout: Duration::from_secs(config.connect_timeout_seconds),
            queue_name: config.queue_name.clone(),
        })
    }

    /// Returns the shared connection, establishing it if there is none yet
    async fn get_connection(&self) -> CacheResult<ConnectionManager> {
        {
            let guard = self.connection.read().await;
            if let Some(ref conn) = *guard {
                return Ok(conn.clone());
            }
        }

        let mut guard = self.connection.write().await;
        if let Some(ref conn) = *guard {
            return Ok(conn.clone());
        }

        let conn = tokio::time::timeout(
            self.connect_timeout,
            ConnectionManager::new(self.client.clone()),
        )
        .await
        .map_err(|_| CacheError::ConnectTimeout(self.connect_timeout))??;

        *guard = Some(conn.clone());
        info!("Code pool connected, queue: '{}'", self.queue_name);
        Ok(conn)
    }
}

#[async_trait]
impl CodePool for RedisCodePool {
    async fn pop_code(&self) -> CacheResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        let code: Option<String> = conn.lpop(&self.queue_name, None).await?;
        Ok(code)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.get_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Pool that is always empty, used when the Redis configuration is unusable
pub struct DisabledCodePool;

#[async_trait]
impl CodePool for DisabledCodePool {
    async fn pop_code(&self) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn ping(&self) -> CacheResult<()> {
        Err(CacheError::Disabled)
    }
}

/// Builds the Redis code pool and tries a first connection.
///
/// An unreachable Redis is not fatal: the pool keeps retrying on demand and
/// callers generate codes locally meanwhile. Only a configuration the client
/// rejects outright falls back to [`DisabledCodePool`].
pub async fn connect_code_pool(config: &CacheConfig) -> Box<dyn CodePool> {
    let pool = match RedisCodePool::new(config) {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Invalid code pool configuration, using local generation only: {}", e);
            return Box::new(DisabledCodePool);
        }
    };

    match pool.ping().await {
        Ok(()) => info!("Successfully connected to code pool"),
        Err(e) => warn!(
            "Code pool unavailable, generating codes locally until it can be reached: {}",
            e
        ),
    }

    Box::new(pool)
}

/// Pings the pool and reports latency
pub async fn health_check(pool: &dyn CodePool) -> CacheHealth {
    let start = Instant::now();
    let result = pool.ping().await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => CacheHealth {
            status: HealthState::Healthy,
            response_time_ms,
            message: None,
        },
        Err(e) => CacheHealth {
            status: HealthState::Unhealthy,
            response_time_ms,
            message: Some(e.to_string()),
        },
    }
}
