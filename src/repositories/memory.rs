//! In-memory repository used by tests in place of PostgreSQL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use super::ShortLinkRepositoryTrait;
use crate::errors::RepositoryError;
use crate::models::{NewShortLink, ShortLink};

type Result<T> = std::result::Result<T, RepositoryError>;

/// Keeps links keyed by short code, mirroring the unique index of the real table.
#[derive(Default)]
pub struct InMemoryShortLinkRepository {
    links: Mutex<HashMap<String, ShortLink>>,
    fail_url_lookups: AtomicBool,
    fail_increments: AtomicBool,
    lookup_delay: Mutex<Option<Duration>>,
}

impl InMemoryShortLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `find_by_original_url` return a database error
    pub fn fail_url_lookups(&self, fail: bool) {
        self.fail_url_lookups.store(fail, Ordering::SeqCst);
    }

    /// Makes `increment_clicks` return a database error
    pub fn fail_increments(&self, fail: bool) {
        self.fail_increments.store(fail, Ordering::SeqCst);
    }

    /// Makes `find_by_code` stall for `delay` before answering
    pub fn delay_lookups(&self, delay: Duration) {
        *self.lookup_delay.lock().unwrap() = Some(delay);
    }

    /// Stores a link as-is, bypassing the registry
    pub fn insert(&self, link: ShortLink) {
        self.links
            .lock()
            .unwrap()
            .insert(link.short_code.clone(), link);
    }

    pub fn get(&self, code: &str) -> Option<ShortLink> {
        self.links.lock().unwrap().get(code).cloned()
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

#[async_trait]
impl ShortLinkRepositoryTrait for InMemoryShortLinkRepository {
    async fn create(&self, link: NewShortLink) -> Result<ShortLink> {
        let mut links = self.links.lock().unwrap();
        if links.contains_key(&link.short_code) {
            return Err(RepositoryError::Conflict(format!(
                "Short code '{}' already exists",
                link.short_code
            )));
        }

        let record = ShortLink {
            id: Uuid::new_v4(),
            original_url: link.original_url,
            short_code: link.short_code,
            created_at: link.created_at,
            expires_at: link.expires_at,
            click_count: 0,
            is_active: true,
        };
        links.insert(record.short_code.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        let delay = *self.lookup_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.get(code))
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        if self.fail_url_lookups.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        Ok(self
            .links
            .lock()
            .unwrap()
            .values()
            .filter(|link| link.original_url == original_url)
            .min_by_key(|link| link.created_at)
            .cloned())
    }

    async fn increment_clicks(&self, code: &str) -> Result<()> {
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        match self.links.lock().unwrap().get_mut(code) {
            Some(link) => {
                link.click_count += 1;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(format!(
                "Short link with code '{}' not found",
                code
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn new_link(code: &str, url: &str) -> NewShortLink {
        NewShortLink {
            original_url: url.to_string(),
            short_code: code.to_string(),
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    #[actix_web::test]
    async fn test_create_enforces_unique_codes() {
        let repo = InMemoryShortLinkRepository::new();

        let created = repo
            .create(new_link("abc123", "https://example.com"))
            .await
            .unwrap();
        assert_eq!(created.click_count, 0);
        assert!(created.is_active);

        let duplicate = repo.create(new_link("abc123", "https://other.com")).await;
        assert!(matches!(duplicate, Err(RepositoryError::Conflict(_))));
        assert_eq!(repo.len(), 1);
    }

    #[actix_web::test]
    async fn test_increment_unknown_code_is_not_found() {
        let repo = InMemoryShortLinkRepository::new();
        let result = repo.increment_clicks("nope99").await;
        assert!(matches!(result, Err(RepositoryError::NotFound(_))));
    }
}
