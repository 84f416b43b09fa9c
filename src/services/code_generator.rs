use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use log::{debug, warn};
use rand::{rngs::OsRng, TryRngCore};

use super::context::{Interrupted, RequestContext};
use crate::cache::CodePool;
use crate::errors::ServiceError;
use crate::validations::{is_valid_short_code, MAX_CODE_LENGTH};

/// Random bytes drawn per locally generated code. Six bytes encode to exactly
/// eight base64 characters, so no entropy is lost to truncation.
const RANDOM_BYTES: usize = 6;

/// Produces short codes, preferring the shared pool and falling back to local generation
#[derive(Clone)]
pub struct CodeGenerator {
    pool: Arc<dyn CodePool>,
}

impl CodeGenerator {
    pub fn new(pool: Arc<dyn CodePool>) -> Self {
        Self { pool }
    }

    /// Pops a pooled code; any pool problem other than cancellation is a miss
    pub async fn get_code(&self, ctx: &RequestContext) -> Result<String, ServiceError> {
        match ctx.bound(self.pool.pop_code()).await {
            Ok(Ok(Some(code))) if is_valid_short_code(&code) => {
                debug!("Using pooled short code '{}'", code);
                return Ok(code);
            }
            Ok(Ok(Some(code))) => {
                warn!("Discarding malformed pooled short code '{}'", code);
            }
            Ok(Ok(None)) => debug!("Code pool exhausted, generating locally"),
            Ok(Err(e)) => debug!("Code pool unavailable, generating locally: {}", e),
            Err(Interrupted::TimedOut) => warn!("Code pool timed out, generating locally"),
            Err(Interrupted::Cancelled) => return Err(ServiceError::Cancelled("pop pooled code")),
        }

        generate_local_code()
    }
}

/// Encodes fresh OS randomness as an 8-character URL-safe code
pub fn generate_local_code() -> Result<String, ServiceError> {
    let mut bytes = [0u8; RANDOM_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        ServiceError::GenerationFailure(format!("Randomness source unavailable: {}", e))
    })?;

    let mut code = URL_SAFE_NO_PAD.encode(bytes);
    code.truncate(MAX_CODE_LENGTH);
    Ok(code)
}
