//! Login pipeline steps.
use crate::credential::{Credential, PunishedError};
use crate::error::LoginError;
use chrono::Utc;
use once_cell::sync::OnceCell;

/// Default strftime format for rendering punishment dates.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Password used to build the decoy hash. Never matches a real attempt
/// because the decoy is only ever validated against when the real hash is
/// missing, and the result is discarded.
const DECOY_PASSWORD: &str = "decoy-password-for-timing";

/// One check in a realm's login pipeline. Steps run in order and the first
/// error ends the login.
pub trait LoginStep: Send + Sync {
    /// Used in traces only.
    fn name(&self) -> &str;

    fn login(&self, credential: &dyn Credential, password: &str) -> Result<(), LoginError>;
}

/// Rejects credentials reporting themselves inactive. Credentials without
/// the capability are always active.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityStep;

impl LoginStep for ActivityStep {
    fn name(&self) -> &str {
        "activity"
    }

    fn login(&self, credential: &dyn Credential, _password: &str) -> Result<(), LoginError> {
        match credential.as_activable() {
            Some(activable) if !activable.is_active() => Err(LoginError::Failed),
            _ => Ok(()),
        }
    }
}

/// Validates the password with the credential's own engine.
#[derive(Debug, Default)]
pub struct PasswordStep {
    decoy: OnceCell<Option<String>>,
}

impl PasswordStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credentials without a password still pay for one validation, so
    /// missing passwords and unknown identifiers take as long as wrong ones.
    fn burn_validation(&self, credential: &dyn Credential, password: &str) {
        let hasher = credential.hasher();
        let decoy = self
            .decoy
            .get_or_init(|| hasher.hash(DECOY_PASSWORD).ok());
        if let Some(decoy) = decoy {
            let _ = hasher.validate(password, decoy);
        }
    }
}

impl LoginStep for PasswordStep {
    fn name(&self) -> &str {
        "password"
    }

    fn login(&self, credential: &dyn Credential, password: &str) -> Result<(), LoginError> {
        let hashed = credential.hashed_password();
        if hashed.is_empty() {
            self.burn_validation(credential, password);
            return Err(LoginError::Failed);
        }
        credential.hasher().validate(password, hashed).map_err(|err| {
            tracing::trace!(error = %err, "password validation failed");
            LoginError::Failed
        })
    }
}

/// Rejects credentials under a ban that has not elapsed yet.
#[derive(Debug, Clone)]
pub struct PunishmentStep {
    time_format: String,
}

impl PunishmentStep {
    pub fn new(time_format: impl Into<String>) -> Self {
        Self {
            time_format: time_format.into(),
        }
    }

    pub fn time_format(&self) -> &str {
        &self.time_format
    }
}

impl Default for PunishmentStep {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_FORMAT)
    }
}

impl LoginStep for PunishmentStep {
    fn name(&self) -> &str {
        "punishment"
    }

    fn login(&self, credential: &dyn Credential, _password: &str) -> Result<(), LoginError> {
        let Some(record) = credential.as_punishable().and_then(|p| p.punishment()) else {
            return Ok(());
        };
        if record.is_active_at(Utc::now()) {
            return Err(PunishedError::from_record(record, &self.time_format).into());
        }
        Ok(())
    }
}

/// Activity, then password, then punishment.
pub fn standard_steps() -> Vec<Box<dyn LoginStep>> {
    standard_steps_with_format(DEFAULT_TIME_FORMAT)
}

/// Like [`standard_steps`], rendering punishment dates with `time_format`.
pub fn standard_steps_with_format(time_format: &str) -> Vec<Box<dyn LoginStep>> {
    vec![
        Box::new(ActivityStep),
        Box::new(PasswordStep::new()),
        Box::new(PunishmentStep::new(time_format)),
    ]
}
