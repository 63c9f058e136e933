//! Punishment records: login bans with an optional end.
use super::CredentialRef;
use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// A ban applied to a credential. `punished_for == None` means permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PunishmentRecord {
    pub punished_on: DateTime<Utc>,
    pub punished_for: Option<Duration>,
    pub reason: Option<String>,
    pub punished_by: Option<CredentialRef>,
}

impl PunishmentRecord {
    pub fn new(
        punished_on: DateTime<Utc>,
        punished_for: Option<Duration>,
        reason: Option<String>,
        punished_by: Option<CredentialRef>,
    ) -> Self {
        Self {
            punished_on,
            punished_for,
            reason,
            punished_by,
        }
    }

    /// When the ban ends. `None` for permanent bans, and for bans whose end
    /// is not representable.
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.punished_for
            .and_then(|length| self.punished_on.checked_add_signed(length))
    }

    /// Whether the ban is in force at `now`. Elapsed bans stay on record
    /// until explicitly cleared, but no longer count.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.punished_for {
            None => true,
            Some(_) => self.ends_at().map_or(true, |end| now < end),
        }
    }
}

/// A credential that may be banned from logging in. Setting a record replaces
/// any previous one; `None` lifts the ban.
pub trait Punishable {
    fn punishment(&self) -> Option<&PunishmentRecord>;
    fn set_punishment(&mut self, record: Option<PunishmentRecord>);
}

/// Returned by the punishment login step for a currently banned credential.
#[derive(Debug, Clone)]
pub struct PunishedError {
    pub punished_on: DateTime<Utc>,
    pub punished_for: Option<Duration>,
    pub reason: Option<String>,
    pub punished_by: Option<CredentialRef>,
    pub time_format: String,
}

impl PunishedError {
    pub fn from_record(record: &PunishmentRecord, time_format: &str) -> Self {
        Self {
            punished_on: record.punished_on,
            punished_for: record.punished_for,
            reason: record.reason.clone(),
            punished_by: record.punished_by.clone(),
            time_format: time_format.to_string(),
        }
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.punished_for
            .and_then(|length| self.punished_on.checked_add_signed(length))
    }

    pub fn is_permanent(&self) -> bool {
        self.punished_for.is_none()
    }
}

impl fmt::Display for PunishedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "punished on: {}", self.punished_on.format(&self.time_format))?;
        match self.ends_at() {
            Some(end) => write!(f, " until: {}", end.format(&self.time_format))?,
            None => f.write_str(" permanently")?,
        }
        if let Some(by) = &self.punished_by {
            write!(f, " by: {by}")?;
        }
        if let Some(reason) = &self.reason {
            write!(f, " with reason: {reason}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PunishedError {}
