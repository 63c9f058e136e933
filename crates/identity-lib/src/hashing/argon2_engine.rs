//! Argon2id password hashing.
use super::{generate_salt, HashingEngine};
use crate::error::{ConstructionError, HashingError};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier},
    Algorithm, Argon2, Params, Version,
};

/// Argon2id engine producing PHC strings.
#[derive(Debug, Clone, Default)]
pub struct Argon2Engine {
    params: Params,
}

impl Argon2Engine {
    /// `memory_kib` must be at least `8 * parallelism`.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, ConstructionError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| ConstructionError::InvalidEngineParams(format!("argon2: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl HashingEngine for Argon2Engine {
    fn name(&self) -> &str {
        "argon2"
    }

    fn hash(&self, password: &str) -> Result<String, HashingError> {
        let salt = generate_salt()?;
        Ok(self.argon2().hash_password(password.as_bytes(), &salt)?.to_string())
    }

    fn validate(&self, password: &str, hash: &str) -> Result<(), HashingError> {
        let parsed_hash = PasswordHash::new(hash)?;
        self.argon2().verify_password(password.as_bytes(), &parsed_hash)?;
        Ok(())
    }
}
