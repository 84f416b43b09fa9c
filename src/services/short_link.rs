// src/services/short_link.rs - Business logic
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{debug, info, warn};

use super::click_recorder::ClickDispatcher;
use super::code_generator::{generate_local_code, CodeGenerator};
use super::context::{CancelHandle, Interrupted, RequestContext};
use crate::config::LinkConfig;
use crate::errors::{RepositoryError, ServiceError};
use crate::models::{NewShortLink, ShortLink};
use crate::repositories::ShortLinkRepositoryTrait;
use crate::validations::validate_url;

type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait ShortLinkServiceTrait {
    /// Returns the existing link for `original_url`, or creates one
    async fn create(
        &self,
        ctx: &RequestContext,
        original_url: &str,
        expires_in_hours: Option<i64>,
    ) -> Result<ShortLink>;

    /// Validates `code` for redirection, queues a click and returns the target URL
    async fn resolve(&self, ctx: &RequestContext, code: &str) -> Result<String>;

    async fn get_stats(&self, ctx: &RequestContext, code: &str) -> Result<ShortLink>;

    /// Produces a code without reserving it
    fn generate_code(&self) -> Result<String>;
}

/// Owns every mutation of short link records
pub struct ShortLinkService {
    repository: Arc<dyn ShortLinkRepositoryTrait>,
    generator: CodeGenerator,
    clicks: ClickDispatcher,
    shutdown: Arc<CancelHandle>,
    config: LinkConfig,
}

impl ShortLinkService {
    pub fn new(
        repository: Arc<dyn ShortLinkRepositoryTrait>,
        generator: CodeGenerator,
        clicks: ClickDispatcher,
        shutdown: Arc<CancelHandle>,
        config: LinkConfig,
    ) -> Self {
        Self {
            repository,
            generator,
            clicks,
            shutdown,
            config,
        }
    }

    /// Context for one request, cancelled when the server shuts down
    pub fn request_context(&self) -> RequestContext {
        self.shutdown.context(self.config.store_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Runs a repository call under the context bounds
    async fn store_call<T, F>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        fut: F,
    ) -> Result<T>
    where
        F: std::future::Future<Output = std::result::Result<T, RepositoryError>>,
    {
        match ctx.bound(fut).await {
            Ok(result) => result.map_err(|e| ServiceError::store(operation, e)),
            Err(Interrupted::TimedOut) => Err(ServiceError::Timeout(operation)),
            Err(Interrupted::Cancelled) => Err(ServiceError::Cancelled(operation)),
        }
    }

    /// Existing link for `original_url`. Lookup failures count as "not found"
    /// so a flaky read never blocks creation.
    async fn find_existing(
        &self,
        ctx: &RequestContext,
        original_url: &str,
    ) -> Result<Option<ShortLink>> {
        match self
            .store_call(
                ctx,
                "find short link by url",
                self.repository.find_by_original_url(original_url),
            )
            .await
        {
            Ok(found) => Ok(found),
            Err(err @ ServiceError::Cancelled(_)) => Err(err),
            Err(err) => {
                warn!("Ignoring failed duplicate check for '{}': {}", original_url, err);
                Ok(None)
            }
        }
    }

    async fn fetch(&self, ctx: &RequestContext, code: &str) -> Result<ShortLink> {
        self.store_call(ctx, "find short link", self.repository.find_by_code(code))
            .await?
            .ok_or_else(|| ServiceError::NotFound(code.to_string()))
    }
}

#[async_trait]
impl ShortLinkServiceTrait for ShortLinkService {
    async fn create(
        &self,
        ctx: &RequestContext,
        original_url: &str,
        expires_in_hours: Option<i64>,
    ) -> Result<ShortLink> {
        let original_url = original_url.trim();
        validate_url(original_url).map_err(|e| {
            ServiceError::InvalidUrl(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid URL".to_string()),
            )
        })?;

        if let Some(existing) = self.find_existing(ctx, original_url).await? {
            debug!(
                "URL '{}' already shortened as '{}'",
                original_url, existing.short_code
            );
            return Ok(existing);
        }

        let created_at = Utc::now();
        let expires_at = match expires_in_hours {
            Some(hours) => Some(
                Duration::try_hours(hours)
                    .and_then(|lifetime| created_at.checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        ServiceError::InvalidExpiry(format!(
                            "Expiry of {} hours is out of range",
                            hours
                        ))
                    })?,
            ),
            None => None,
        };

        for attempt in 1..=self.config.max_code_attempts {
            let short_code = self.generator.get_code(ctx).await?;
            let new_link = NewShortLink {
                original_url: original_url.to_string(),
                short_code: short_code.clone(),
                created_at,
                expires_at,
            };

            match self
                .store_call(ctx, "create short link", self.repository.create(new_link))
                .await
            {
                Ok(link) => {
                    info!("Created short code '{}' for '{}'", link.short_code, original_url);
                    return Ok(link);
                }
                Err(ServiceError::StoreFailure {
                    source: RepositoryError::Conflict(_),
                    ..
                }) => {
                    warn!(
                        "Short code '{}' collided (attempt {}/{})",
                        short_code, attempt, self.config.max_code_attempts
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Err(ServiceError::GenerationFailure(format!(
            "No unique short code after {} attempts",
            self.config.max_code_attempts
        )))
    }

    async fn resolve(&self, ctx: &RequestContext, code: &str) -> Result<String> {
        let link = self.fetch(ctx, code).await?;

        if !link.is_active {
            return Err(ServiceError::Inactive(code.to_string()));
        }
        if link.is_expired_at(Utc::now()) {
            return Err(ServiceError::Expired(code.to_string()));
        }

        self.clicks.dispatch(&link.short_code);

        Ok(link.original_url)
    }

    async fn get_stats(&self, ctx: &RequestContext, code: &str) -> Result<ShortLink> {
        self.fetch(ctx, code).await
    }

    fn generate_code(&self) -> Result<String> {
        generate_local_code()
    }
}
