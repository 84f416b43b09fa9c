// src/repositories/short_link.rs - Data access
use async_trait::async_trait;
use log::{debug, error};
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{NewShortLink, ShortLink};

type Result<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait ShortLinkRepositoryTrait: Send + Sync {
    /// Persists a new short link and returns the stored record
    ///
    /// ### Errors
    /// * `RepositoryError::Conflict` - If the short code is already taken
    /// * `RepositoryError::Database` - If a database error occurs
    async fn create(&self, link: NewShortLink) -> Result<ShortLink>;

    /// Finds a short link by its unique short code
    ///
    /// ### Returns
    /// * `Result<Option<ShortLink>>` - The link if found, or `None` if not found
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>>;

    /// Finds a short link by the URL it points to
    ///
    /// ### Returns
    /// * `Result<Option<ShortLink>>` - The oldest matching link, or `None`
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortLink>>;

    /// Atomically adds one to the click counter of the link with `code`
    ///
    /// ### Errors
    /// * `RepositoryError::NotFound` - If no link has this short code
    /// * `RepositoryError::Database` - If a database error occurs
    async fn increment_clicks(&self, code: &str) -> Result<()>;
}

// Implementation using actual database
pub struct PgShortLinkRepository {
    pool: PgPool,
}

impl PgShortLinkRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl ShortLinkRepositoryTrait for PgShortLinkRepository {
    async fn create(&self, link: NewShortLink) -> Result<ShortLink> {
        sqlx::query_as::<_, ShortLink>(
            r#"
                INSERT INTO short_links
                (original_url, short_code, created_at, expires_at, click_count, is_active)
                VALUES ($1, $2, $3, $4, 0, TRUE)
                RETURNING id, original_url, short_code, created_at, expires_at, click_count, is_active
            "#,
        )
        .bind(&link.original_url)
        .bind(&link.short_code)
        .bind(link.created_at)
        .bind(link.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let err = RepositoryError::from(e);
            if !matches!(err, RepositoryError::Conflict(_)) {
                error!("Failed to insert short link '{}': {}", link.short_code, err);
            }
            err
        })
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        sqlx::query_as::<_, ShortLink>(
            r#"
                SELECT id, original_url, short_code, created_at, expires_at, click_count, is_active
                FROM short_links
                WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortLink>> {
        sqlx::query_as::<_, ShortLink>(
            r#"
                SELECT id, original_url, short_code, created_at, expires_at, click_count, is_active
                FROM short_links
                WHERE original_url = $1
                ORDER BY created_at ASC
                LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::Database)
    }

    async fn increment_clicks(&self, code: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
                UPDATE short_links
                SET click_count = click_count + 1
                WHERE short_code = $1
            "#,
        )
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::Database)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!(
                "Short link with code '{}' not found",
                code
            )));
        }

        debug!("Incremented click count for '{}'", code);
        Ok(())
    }
}
