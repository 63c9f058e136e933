// crates/identity-lib/src/error.rs

//! Error types, one enum per concern, with stable codes and sanitized messages.
use crate::credential::PunishedError;
use thiserror::Error;

/// Invalid engine, source or realm setups. Raised while wiring things together,
/// never while serving a login.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("no hashing engines were specified")]
    NoHashers,

    #[error("a hashing engine reported an empty name")]
    EmptyHasherName,

    #[error("hashing engine name must not contain ':': {0}")]
    InvalidHasherName(String),

    #[error("duplicate hashing engine name: {0}")]
    DuplicateHasherName(String),

    #[error("nesting multi hashing engines is forbidden")]
    NestedMultiHasher,

    #[error("default hashing engine {0} is not among the registered engines")]
    MissingDefault(String),

    #[error("invalid hashing engine parameters: {0}")]
    InvalidEngineParams(String),

    #[error("broker does not allow credentials of type {0}")]
    TemplateNotAllowed(&'static str),

    #[error("realm names must not be empty")]
    EmptyRealmName,

    #[error("duplicate realm name: {0}")]
    DuplicateRealm(String),
}

impl ConstructionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConstructionError::NoHashers => "SETUP_001",
            ConstructionError::EmptyHasherName => "SETUP_002",
            ConstructionError::InvalidHasherName(_) => "SETUP_003",
            ConstructionError::DuplicateHasherName(_) => "SETUP_004",
            ConstructionError::NestedMultiHasher => "SETUP_005",
            ConstructionError::MissingDefault(_) => "SETUP_006",
            ConstructionError::InvalidEngineParams(_) => "SETUP_007",
            ConstructionError::TemplateNotAllowed(_) => "SETUP_008",
            ConstructionError::EmptyRealmName => "SETUP_009",
            ConstructionError::DuplicateRealm(_) => "SETUP_010",
        }
    }

    /// Setup errors never reach end users, so the message is fixed.
    pub fn sanitized_message(&self) -> String {
        "Service is misconfigured".to_string()
    }
}

/// Failures of a hashing engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashingError {
    #[error("unregistered hashing engine: {0}")]
    UnregisteredEngine(String),

    #[error("password does not match the hash")]
    Mismatch,

    #[error("hashing algorithm error: {0}")]
    Algorithm(scrypt::password_hash::Error),
}

impl HashingError {
    pub fn error_code(&self) -> &'static str {
        match self {
            HashingError::UnregisteredEngine(_) => "HASH_001",
            HashingError::Mismatch => "HASH_002",
            HashingError::Algorithm(_) => "HASH_003",
        }
    }

    pub fn sanitized_message(&self) -> String {
        match self {
            HashingError::Mismatch => "Authentication failed".to_string(),
            HashingError::UnregisteredEngine(_) | HashingError::Algorithm(_) => {
                "An internal error occurred".to_string()
            },
        }
    }
}

impl From<scrypt::password_hash::Error> for HashingError {
    fn from(err: scrypt::password_hash::Error) -> Self {
        match err {
            scrypt::password_hash::Error::Password => HashingError::Mismatch,
            other => HashingError::Algorithm(other),
        }
    }
}

/// Errors reported by a persistence broker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("backend error: {0}")]
    Backend(String),

    #[error("credential is not stored: {0}")]
    NotStored(String),

    #[error("conflicting credential: {0}")]
    Conflict(String),
}

impl BrokerError {
    pub fn error_code(&self) -> &'static str {
        match self {
            BrokerError::Backend(_) => "STORE_001",
            BrokerError::NotStored(_) => "STORE_002",
            BrokerError::Conflict(_) => "STORE_003",
        }
    }

    pub fn sanitized_message(&self) -> String {
        "An internal error occurred".to_string()
    }
}

/// Errors of a credential source: the broker's own failures plus type checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("credential type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl SourceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SourceError::Broker(err) => err.error_code(),
            SourceError::TypeMismatch { .. } => "SOURCE_001",
        }
    }

    pub fn sanitized_message(&self) -> String {
        "An internal error occurred".to_string()
    }
}

/// Login rejections. `Failed` is shared by unknown identifiers, inactive
/// credentials and bad or missing passwords.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("login failed")]
    Failed,

    #[error(transparent)]
    Punished(#[from] PunishedError),

    #[error("credential lookup failed: {0}")]
    Lookup(#[from] SourceError),

    #[error("login rejected: {0}")]
    Rejected(Box<dyn std::error::Error + Send + Sync>),
}

impl LoginError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            LoginError::Failed => "LOGIN_001",
            LoginError::Punished(_) => "LOGIN_002",
            LoginError::Lookup(_) => "LOGIN_003",
            LoginError::Rejected(_) => "LOGIN_004",
        }
    }

    /// Message safe to show to the party attempting the login.
    ///
    /// Lookup failures read the same as a bad password so callers cannot
    /// probe which identifiers exist.
    pub fn sanitized_message(&self) -> String {
        match self {
            LoginError::Failed | LoginError::Lookup(_) => "Authentication failed".to_string(),
            LoginError::Punished(p) => p.to_string(),
            LoginError::Rejected(_) => "Login rejected".to_string(),
        }
    }
}

/// Password lifecycle errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("invalid current password")]
    BadCurrentPassword,

    #[error("the credential is not a recoverable type")]
    NotRecoverable,

    #[error("invalid token on password reset confirm, or password reset was not issued")]
    BadToken,

    #[error("the new password does not meet the password requirements")]
    TooWeak,

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl PasswordError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PasswordError::BadCurrentPassword => "PWD_001",
            PasswordError::NotRecoverable => "PWD_002",
            PasswordError::BadToken => "PWD_003",
            PasswordError::TooWeak => "PWD_004",
            PasswordError::Hashing(_) => "PWD_005",
            PasswordError::Source(_) => "PWD_006",
        }
    }

    pub fn sanitized_message(&self) -> String {
        match self {
            PasswordError::BadCurrentPassword => "Invalid current password".to_string(),
            PasswordError::NotRecoverable | PasswordError::BadToken => {
                "Invalid or expired password reset".to_string()
            },
            PasswordError::TooWeak => "Password does not meet the requirements".to_string(),
            PasswordError::Hashing(_) | PasswordError::Source(_) => {
                "An internal error occurred".to_string()
            },
        }
    }
}

/// Errors of punishment administration.
#[derive(Error, Debug)]
pub enum PunishError {
    #[error("the credential is not a punishable type")]
    NotPunishable,

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl PunishError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PunishError::NotPunishable => "PUNISH_001",
            PunishError::Source(_) => "PUNISH_002",
        }
    }

    pub fn sanitized_message(&self) -> String {
        match self {
            PunishError::NotPunishable => "This account cannot be punished".to_string(),
            PunishError::Source(_) => "An internal error occurred".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("unauthorized to execute the action")]
    Unauthorized,
}

impl AuthorizationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthorizationError::Unauthorized => "AUTHZ_001",
        }
    }

    pub fn sanitized_message(&self) -> String {
        match self {
            AuthorizationError::Unauthorized => "Insufficient permissions".to_string(),
        }
    }
}

/// Errors of multi-realm dispatch.
#[derive(Error, Debug)]
pub enum MultiRealmError {
    #[error("invalid realm: {0}")]
    InvalidRealm(String),

    #[error(transparent)]
    Login(#[from] LoginError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl MultiRealmError {
    pub fn error_code(&self) -> &'static str {
        match self {
            MultiRealmError::InvalidRealm(_) => "REALM_001",
            MultiRealmError::Login(err) => err.error_code(),
            MultiRealmError::Source(_) => "REALM_002",
        }
    }

    pub fn sanitized_message(&self) -> String {
        match self {
            MultiRealmError::InvalidRealm(_) => "Invalid realm".to_string(),
            MultiRealmError::Login(err) => err.sanitized_message(),
            MultiRealmError::Source(_) => "An internal error occurred".to_string(),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::Extract(_) => "CONFIG_001",
            ConfigError::Invalid(_) => "CONFIG_002",
        }
    }

    pub fn sanitized_message(&self) -> String {
        "Service is misconfigured".to_string()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extract(Box::new(err))
    }
}
