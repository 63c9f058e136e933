// ============================
// identity-lib/src/hashing/mod.rs
// ============================
//! Password hashing engines.
//!
//! An engine turns a password into a self-describing salted hash and checks
//! passwords against such hashes. `MultiHashingEngine` tags every hash it
//! writes with the producing engine's name so stored hashes survive a change
//! of the default algorithm.

mod argon2_engine;
mod multi;
mod scrypt_engine;

pub use argon2_engine::Argon2Engine;
pub use multi::{MultiHashingEngine, TAG_SEPARATOR};
pub use scrypt_engine::ScryptEngine;

use crate::config::HashingSettings;
use crate::error::{ConstructionError, HashingError};
use std::sync::Arc;

/// Contract every password hashing algorithm satisfies.
pub trait HashingEngine: Send + Sync {
    /// Unique, non-empty name within a multi-engine group.
    fn name(&self) -> &str;

    fn hash(&self, password: &str) -> Result<String, HashingError>;

    /// `Ok(())` iff `password` matches `hash`.
    fn validate(&self, password: &str, hash: &str) -> Result<(), HashingError>;

    /// Only `MultiHashingEngine` answers `true`; used to forbid nesting.
    fn is_multi(&self) -> bool {
        false
    }
}

/// Salt for PHC-string hashes, drawn from the thread-local CSPRNG.
pub(crate) fn generate_salt() -> Result<scrypt::password_hash::SaltString, HashingError> {
    use rand::RngCore;

    let mut bytes = [0u8; scrypt::password_hash::Salt::RECOMMENDED_LENGTH];
    rand::rng().fill_bytes(&mut bytes);
    Ok(scrypt::password_hash::SaltString::encode_b64(&bytes)?)
}

/// Build the configured engine group: scrypt and argon2, with the configured
/// default used for new hashes.
pub fn build_engine(settings: &HashingSettings) -> Result<Arc<MultiHashingEngine>, ConstructionError> {
    let scrypt: Arc<dyn HashingEngine> = Arc::new(ScryptEngine::with_params(
        settings.scrypt.log_n,
        settings.scrypt.r,
        settings.scrypt.p,
    )?);
    let argon2: Arc<dyn HashingEngine> = Arc::new(Argon2Engine::with_params(
        settings.argon2.memory_kib,
        settings.argon2.iterations,
        settings.argon2.parallelism,
    )?);

    let default = [&scrypt, &argon2]
        .into_iter()
        .find(|engine| engine.name() == settings.default_engine)
        .cloned()
        .ok_or_else(|| ConstructionError::MissingDefault(settings.default_engine.clone()))?;

    tracing::debug!(default_engine = %settings.default_engine, "hashing engines configured");
    Ok(Arc::new(MultiHashingEngine::with_default(default, vec![scrypt, argon2])?))
}
