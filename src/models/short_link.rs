// src/models/short_link.rs - Pure data structures
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validations::validate_url;

/// Request body for `POST /api/v1/shorten`
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ShortenRequestDto {
    #[validate(custom(function = "validate_url"))]
    pub url: String,

    /// Lifetime in hours; negative values create an already-expired link
    pub expires_in: Option<i64>,
}

/// A persisted mapping from a short code to an original URL
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ShortLink {
    /// Store-assigned identifier
    pub id: Uuid,

    /// The original, long URL that was shortened
    pub original_url: String,

    /// The short code that identifies this URL, unique across all links
    pub short_code: String,

    pub created_at: DateTime<Utc>,

    /// When this link stops redirecting (None means it never expires)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Number of successful redirects
    pub click_count: i64,

    /// Links are created active; inactive links never redirect
    pub is_active: bool,
}

impl ShortLink {
    /// Checks whether the link has expired relative to `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expiry) => now > expiry,
            None => false,
        }
    }
}

/// Fields supplied by the registry when creating a link
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub original_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponseDto {
    pub short_url: String,
    pub short_code: String,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenResponseDto {
    pub fn from_link(link: ShortLink, base_url: &str) -> Self {
        Self {
            short_url: format!("{}/{}", base_url, link.short_code),
            short_code: link.short_code,
            original_url: link.original_url,
            expires_at: link.expires_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponseDto {
    pub short_code: String,
}
