// ============================
// identity-lib/src/config.rs
// ============================
//! Configuration management.
use crate::error::ConfigError;
use crate::policy::PasswordRequirements;
use crate::token::{DEFAULT_RECOVERY_TTL_SECS, DEFAULT_TOKEN_BYTES};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level
    pub log_level: String,
    /// Password hashing engines
    pub hashing: HashingSettings,
    /// Password recovery tokens
    pub recovery: RecoverySettings,
    /// Password requirements
    pub password_requirements: PasswordRequirements,
    /// strftime format used when rendering punishment errors
    pub punishment_time_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingSettings {
    /// Engine used for new hashes: `scrypt` or `argon2`
    pub default_engine: String,
    pub scrypt: ScryptSettings,
    pub argon2: Argon2Settings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScryptSettings {
    pub log_n: u8,
    pub r: u32,
    pub p: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Argon2Settings {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverySettings {
    /// Random bytes per generated token
    pub token_bytes: usize,
    /// Token lifetime in seconds
    pub ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            hashing: HashingSettings::default(),
            recovery: RecoverySettings::default(),
            password_requirements: PasswordRequirements::default(),
            punishment_time_format: "%Y-%m-%dT%H:%M:%S".to_string(),
        }
    }
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            default_engine: "argon2".to_string(),
            scrypt: ScryptSettings::default(),
            argon2: Argon2Settings::default(),
        }
    }
}

impl Default for ScryptSettings {
    fn default() -> Self {
        Self { log_n: 17, r: 8, p: 1 }
    }
}

impl Default for Argon2Settings {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            token_bytes: DEFAULT_TOKEN_BYTES,
            ttl_secs: DEFAULT_RECOVERY_TTL_SECS,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const ENGINES: [&str; 2] = ["scrypt", "argon2"];
const MAX_RECOVERY_TTL_SECS: u64 = 60 * 60 * 24 * 30; // 30 days

impl Settings {
    /// Load settings from `config.{toml,yaml,json}` in the working directory,
    /// then `IDENTITY_*` environment variables (`__` separates nested keys).
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = Self::base()
            .merge(Toml::file("config.toml"))
            .merge(Yaml::file("config.yaml"))
            .merge(Json::file("config.json"))
            .merge(Env::prefixed("IDENTITY_").split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a single TOML file, on top of the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let settings: Settings = Self::base().merge(Toml::file(path.as_ref())).extract()?;
        settings.validate()?;
        Ok(settings)
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!("unknown log level: {}", self.log_level)));
        }
        if !ENGINES.contains(&self.hashing.default_engine.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown hashing engine: {}",
                self.hashing.default_engine
            )));
        }
        if self.hashing.scrypt.log_n == 0 || self.hashing.scrypt.r == 0 || self.hashing.scrypt.p == 0 {
            return Err(ConfigError::Invalid("scrypt parameters must be positive".to_string()));
        }
        if self.hashing.argon2.iterations == 0
            || self.hashing.argon2.parallelism == 0
            || self.hashing.argon2.memory_kib < 8 * self.hashing.argon2.parallelism
        {
            return Err(ConfigError::Invalid(
                "argon2 needs iterations >= 1 and memory_kib >= 8 * parallelism".to_string(),
            ));
        }
        if self.recovery.token_bytes < 16 {
            return Err(ConfigError::Invalid("recovery tokens need at least 16 bytes".to_string()));
        }
        if self.recovery.ttl_secs == 0 || self.recovery.ttl_secs > MAX_RECOVERY_TTL_SECS {
            return Err(ConfigError::Invalid(format!(
                "recovery token ttl must be between 1 and {MAX_RECOVERY_TTL_SECS} seconds"
            )));
        }
        if self.password_requirements.min_length < 6 {
            return Err(ConfigError::Invalid("minimum password length must be at least 6".to_string()));
        }
        if self.punishment_time_format.is_empty() {
            return Err(ConfigError::Invalid("punishment time format must not be empty".to_string()));
        }
        Ok(())
    }

    /// Recovery token lifetime, clamped to the accepted maximum.
    pub fn recovery_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.recovery.ttl_secs.min(MAX_RECOVERY_TTL_SECS) as i64)
    }
}
