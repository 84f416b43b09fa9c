use url::Url;
use validator::ValidationError;

/// Shortest and longest accepted short code
pub const MIN_CODE_LENGTH: usize = 6;
pub const MAX_CODE_LENGTH: usize = 8;

/// Validates that a URL string is absolute, with a non-empty scheme and host
pub fn validate_url(url_str: &str) -> Result<(), ValidationError> {
    match Url::parse(url_str.trim()) {
        Ok(url) => {
            let has_host = url.host_str().map(|h| !h.is_empty()).unwrap_or(false);
            if url.scheme().is_empty() || !has_host {
                let mut err = ValidationError::new("invalid_url");
                err.message = Some("URL must have a scheme and host".into());
                return Err(err);
            }

            Ok(())
        }
        Err(_) => {
            let mut err = ValidationError::new("invalid_url");
            err.message = Some("Invalid URL format".into());
            Err(err)
        }
    }
}

/// Short codes are 6-8 characters from the URL-safe base64 alphabet
pub fn is_valid_short_code(code: &str) -> bool {
    (MIN_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
