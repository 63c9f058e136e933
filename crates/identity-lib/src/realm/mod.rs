// ============================
// identity-lib/src/realm/mod.rs
// ============================
//! Realms: a credential source plus the login pipeline run against it.
//!
//! Login looks the identifier up, then runs every step against the found
//! credential. When nothing is found the same steps still run against a
//! dummy credential and their outcome is thrown away, so unknown identifiers
//! cost about as much as known ones.

mod multi;
mod password;
mod steps;

pub use multi::MultiRealm;
pub use steps::{
    standard_steps, standard_steps_with_format, ActivityStep, LoginStep, PasswordStep, PunishmentStep,
    DEFAULT_TIME_FORMAT,
};

use crate::config::Settings;
use crate::credential::Credential;
use crate::error::{LoginError, SourceError};
use crate::metrics::{LOGIN_REJECTED, LOGIN_SUCCEEDED, LOGIN_UNKNOWN};
use crate::policy::PasswordRequirements;
use crate::source::CredentialSource;
use crate::token::{DEFAULT_RECOVERY_TTL_SECS, DEFAULT_TOKEN_BYTES};
use chrono::Duration;
use identity_common::Index;
use metrics::counter;
use std::fmt;

/// A login domain over one credential source.
pub struct Realm {
    source: CredentialSource,
    steps: Vec<Box<dyn LoginStep>>,
    password_policy: Option<PasswordRequirements>,
    token_bytes: usize,
    recovery_ttl: Duration,
}

impl Realm {
    /// The step list is fixed for the realm's lifetime.
    pub fn new(source: CredentialSource, steps: Vec<Box<dyn LoginStep>>) -> Self {
        Self {
            source,
            steps,
            password_policy: None,
            token_bytes: DEFAULT_TOKEN_BYTES,
            recovery_ttl: Duration::seconds(DEFAULT_RECOVERY_TTL_SECS as i64),
        }
    }

    /// Realm with the standard steps, the configured password requirements
    /// and recovery token size and lifetime.
    pub fn from_settings(source: CredentialSource, settings: &Settings) -> Self {
        Self::new(source, standard_steps_with_format(&settings.punishment_time_format))
            .with_password_policy(settings.password_requirements.clone())
            .with_token_bytes(settings.recovery.token_bytes)
            .with_recovery_ttl(settings.recovery_ttl())
    }

    /// Reject new passwords that do not meet `requirements`.
    pub fn with_password_policy(mut self, requirements: PasswordRequirements) -> Self {
        self.password_policy = Some(requirements);
        self
    }

    /// Random bytes per token generated by `issue_password_reset`.
    pub fn with_token_bytes(mut self, bytes: usize) -> Self {
        self.token_bytes = bytes;
        self
    }

    /// Lifetime of tokens generated by `issue_password_reset`.
    pub fn with_recovery_ttl(mut self, ttl: Duration) -> Self {
        self.recovery_ttl = ttl;
        self
    }

    pub fn recovery_ttl(&self) -> Duration {
        self.recovery_ttl
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }

    pub fn steps(&self) -> impl Iterator<Item = &dyn LoginStep> {
        self.steps.iter().map(|step| step.as_ref())
    }

    pub fn password_policy(&self) -> Option<&PasswordRequirements> {
        self.password_policy.as_ref()
    }

    pub fn by_identifier(&self, identifier: &str) -> Result<Option<Box<dyn Credential>>, SourceError> {
        self.source.by_identifier(identifier)
    }

    pub fn by_index(&self, index: &Index) -> Result<Option<Box<dyn Credential>>, SourceError> {
        self.source.by_index(index)
    }

    /// Authenticate `identifier` with `password`.
    ///
    /// Unknown identifiers and lookup failures run the pipeline against a
    /// dummy credential before failing. A lookup failure is reported as
    /// `LoginError::Lookup`, anything else as the first failing step's error.
    pub fn login(&self, identifier: &str, password: &str) -> Result<Box<dyn Credential>, LoginError> {
        let _span = tracing::debug_span!("realm_login").entered();
        match self.source.by_identifier(identifier) {
            Ok(Some(credential)) => self.authenticate(credential, password),
            Ok(None) => {
                self.run_dummy_pipeline(password);
                Err(LoginError::Failed)
            },
            Err(err) => {
                self.run_dummy_pipeline(password);
                Err(LoginError::Lookup(err))
            },
        }
    }

    /// Run the pipeline against an already retrieved credential.
    pub(crate) fn authenticate(
        &self,
        credential: Box<dyn Credential>,
        password: &str,
    ) -> Result<Box<dyn Credential>, LoginError> {
        for step in &self.steps {
            if let Err(err) = step.login(credential.as_ref(), password) {
                tracing::debug!(step = step.name(), code = err.error_code(), "login rejected");
                counter!(LOGIN_REJECTED).increment(1);
                return Err(err);
            }
        }
        tracing::debug!("login succeeded");
        counter!(LOGIN_SUCCEEDED).increment(1);
        Ok(credential)
    }

    /// Every step runs against a fresh dummy and every result is dropped.
    pub(crate) fn run_dummy_pipeline(&self, password: &str) {
        let dummy = self.source.dummy();
        for step in &self.steps {
            let outcome = step.login(dummy.as_ref(), password);
            std::hint::black_box(outcome.is_ok());
        }
        tracing::debug!("no credential found, dummy pipeline completed");
        counter!(LOGIN_UNKNOWN).increment(1);
    }
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Realm")
            .field("source", &self.source)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("password_policy", &self.password_policy)
            .field("recovery_ttl", &self.recovery_ttl)
            .finish_non_exhaustive()
    }
}
