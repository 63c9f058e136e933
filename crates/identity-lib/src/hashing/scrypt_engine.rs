// ============================
// identity-lib/src/hashing/scrypt_engine.rs
// ============================
//! scrypt password hashing.
use super::{generate_salt, HashingEngine};
use crate::error::{ConstructionError, HashingError};
use scrypt::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier},
    Params, Scrypt,
};

/// scrypt engine producing PHC strings (`$scrypt$ln=..,r=..,p=..$salt$hash`).
/// Validation reads the cost parameters from the hash, so hashes written with
/// older parameters stay valid after a cost change.
#[derive(Debug, Clone)]
pub struct ScryptEngine {
    params: Params,
}

impl Default for ScryptEngine {
    fn default() -> Self {
        Self {
            params: Params::recommended(),
        }
    }
}

impl ScryptEngine {
    pub fn with_params(log_n: u8, r: u32, p: u32) -> Result<Self, ConstructionError> {
        let params = Params::new(log_n, r, p, Params::RECOMMENDED_LEN)
            .map_err(|e| ConstructionError::InvalidEngineParams(format!("scrypt: {e}")))?;
        Ok(Self { params })
    }
}

impl HashingEngine for ScryptEngine {
    fn name(&self) -> &str {
        "scrypt"
    }

    fn hash(&self, password: &str) -> Result<String, HashingError> {
        let salt = generate_salt()?;
        let hash = Scrypt
            .hash_password_customized(password.as_bytes(), None, None, self.params.clone(), &salt)?
            .to_string();
        Ok(hash)
    }

    fn validate(&self, password: &str, hash: &str) -> Result<(), HashingError> {
        let parsed_hash = PasswordHash::new(hash)?;
        Scrypt.verify_password(password.as_bytes(), &parsed_hash)?;
        Ok(())
    }
}
