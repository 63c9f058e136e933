//! Password recovery tokens with lazy expiry.
use chrono::{DateTime, Utc};

/// A recovery token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl RecoveryToken {
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }
}

/// A credential supporting password recovery.
pub trait Recoverable {
    /// Current token. An expired token must read as absent, and should be
    /// cleared by the read itself.
    fn recovery_token(&mut self) -> Option<RecoveryToken>;

    /// Replace the stored token. `None` clears it.
    fn set_recovery_token(&mut self, token: Option<RecoveryToken>);
}

/// Storage for a recovery token implementing the lazy-expiry rule; embed it
/// in a credential and forward `Recoverable` to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoverySlot {
    current: Option<RecoveryToken>,
}

impl RecoverySlot {
    pub fn get(&mut self) -> Option<RecoveryToken> {
        self.get_at(Utc::now())
    }

    pub fn get_at(&mut self, now: DateTime<Utc>) -> Option<RecoveryToken> {
        if self.current.as_ref().is_some_and(|t| !t.is_valid_at(now)) {
            self.current = None;
        }
        self.current.clone()
    }

    /// Store a token. Empty tokens clear the slot.
    pub fn set(&mut self, token: Option<RecoveryToken>) {
        self.current = token.filter(|t| !t.token.is_empty());
    }

    /// Raw stored value, without applying expiry.
    pub fn peek(&self) -> Option<&RecoveryToken> {
        self.current.as_ref()
    }
}
