//! Prefixed identifiers
//!
//! IDs look like `{prefix}_{random}` where the random part is 12 bytes
//! (96 bits) from the OS RNG, base64 URL-safe encoded without padding.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

use crate::error::GenerationError;

const ID_ENTROPY_BYTES: usize = 12;

/// Source of record identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self, prefix: &str) -> Result<String, GenerationError>;
}

/// Identifiers drawn from the OS entropy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngIdGenerator;

impl IdGenerator for OsRngIdGenerator {
    fn generate(&self, prefix: &str) -> Result<String, GenerationError> {
        generate_prefixed_id(prefix)
    }
}

/// Generate a prefixed ID, failing if the OS entropy source is unavailable.
pub fn generate_prefixed_id(prefix: &str) -> Result<String, GenerationError> {
    generate_prefixed_id_with(&mut OsRng, prefix)
}

/// Generate a prefixed ID from `rng`.
pub fn generate_prefixed_id_with<R>(rng: &mut R, prefix: &str) -> Result<String, GenerationError>
where
    R: TryRngCore,
    R::Error: std::fmt::Display,
{
    let mut bytes = [0u8; ID_ENTROPY_BYTES];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| GenerationError::EntropyUnavailable(e.to_string()))?;

    let encoded = BASE64_URL_SAFE_NO_PAD.encode(bytes);

    Ok(format!("{prefix}_{encoded}"))
}
