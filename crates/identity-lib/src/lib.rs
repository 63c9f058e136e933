// ============================
// identity-lib/src/lib.rs
// ============================
//! Credential authentication and authorization engine.
//!
//! Realms log credentials in through an ordered pipeline of steps, password
//! hashes are produced and checked by pluggable hashing engines, and
//! authorization decisions are made by evaluating requirement trees against
//! authenticated credentials. Persistence is delegated to brokers.

pub mod authz;
pub mod config;
pub mod credential;
pub mod error;
pub mod hashing;
pub mod metrics;
pub mod policy;
pub mod realm;
pub mod source;
pub mod storage;
pub mod token;

pub use authz::{authorize, AuthorizationRequirement, Requirement};
pub use config::Settings;
pub use credential::{same_credential, Credential, CredentialRef};
pub use error::{
    AuthorizationError, BrokerError, ConfigError, ConstructionError, HashingError, LoginError, MultiRealmError,
    PasswordError, PunishError, SourceError,
};
pub use hashing::{build_engine, Argon2Engine, HashingEngine, MultiHashingEngine, ScryptEngine};
pub use realm::{standard_steps, LoginStep, MultiRealm, Realm};
pub use source::CredentialSource;
pub use storage::{Broker, MemoryBroker};

pub use identity_common::{Index, Scope, ScopeSet};
