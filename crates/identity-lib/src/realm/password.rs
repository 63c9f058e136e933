//! Password lifecycle and punishment administration.
//!
//! Every operation here mutates an already retrieved credential and persists
//! it through the realm's source. When persisting fails the credential is put
//! back the way it was, so callers never hold a half-applied change.
use super::Realm;
use crate::credential::{Credential, CredentialRef, PunishmentRecord, RecoveryToken};
use crate::error::{HashingError, PasswordError, PunishError, SourceError};
use crate::metrics::{CREDENTIAL_PUNISHED, PASSWORD_CHANGED, PASSWORD_RESET_CONFIRMED, PASSWORD_RESET_PREPARED};
use crate::policy::validate_password_strength;
use crate::token::{generate_recovery_token_with_size, tokens_match};
use chrono::{DateTime, Duration, Utc};
use metrics::counter;

impl Realm {
    /// Hash and store a new password.
    pub fn set_password(&self, credential: &mut dyn Credential, password: &str) -> Result<(), PasswordError> {
        self.check_policy(password)?;
        let hashed = credential.hasher().hash(password)?;
        self.replace_hash(credential, hashed)?;
        tracing::debug!("password set");
        counter!(PASSWORD_CHANGED).increment(1);
        Ok(())
    }

    /// Remove the password. The credential cannot log in until a new one is set.
    pub fn unset_password(&self, credential: &mut dyn Credential) -> Result<(), PasswordError> {
        self.replace_hash(credential, String::new())?;
        tracing::debug!("password unset");
        Ok(())
    }

    /// Set a new password after proving knowledge of the current one.
    pub fn change_password(
        &self,
        credential: &mut dyn Credential,
        current: &str,
        new: &str,
    ) -> Result<(), PasswordError> {
        let hashed = credential.hashed_password();
        if hashed.is_empty() {
            return Err(PasswordError::BadCurrentPassword);
        }
        credential.hasher().validate(current, hashed).map_err(|err| match err {
            HashingError::Mismatch => PasswordError::BadCurrentPassword,
            other => PasswordError::Hashing(other),
        })?;
        self.set_password(credential, new)
    }

    /// Store `token` as the credential's recovery token, valid for `ttl`.
    /// An empty token clears any pending reset.
    pub fn prepare_password_reset(
        &self,
        credential: &mut dyn Credential,
        token: &str,
        ttl: Duration,
    ) -> Result<(), PasswordError> {
        let expires_at = Utc::now().checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let next = (!token.is_empty()).then(|| RecoveryToken::new(token, expires_at));
        let previous = {
            let recoverable = credential.as_recoverable_mut().ok_or(PasswordError::NotRecoverable)?;
            let previous = recoverable.recovery_token();
            recoverable.set_recovery_token(next.clone());
            previous
        };
        if let Err(err) = self.source.save(credential) {
            put_token(credential, previous);
            return Err(err.into());
        }
        if next.is_some() {
            tracing::debug!("password reset prepared");
            counter!(PASSWORD_RESET_PREPARED).increment(1);
        }
        Ok(())
    }

    /// Generate a random token, store it for the realm's recovery lifetime
    /// and hand it back for delivery to the credential's owner.
    pub fn issue_password_reset(&self, credential: &mut dyn Credential) -> Result<String, PasswordError> {
        let token = generate_recovery_token_with_size(self.token_bytes);
        self.prepare_password_reset(credential, &token, self.recovery_ttl)?;
        Ok(token)
    }

    pub fn cancel_password_reset(&self, credential: &mut dyn Credential) -> Result<(), PasswordError> {
        self.prepare_password_reset(credential, "", Duration::zero())
    }

    /// Set a new password if `token` matches the pending, unexpired recovery
    /// token. The token is consumed on success.
    pub fn confirm_password_reset(
        &self,
        credential: &mut dyn Credential,
        token: &str,
        new: &str,
    ) -> Result<(), PasswordError> {
        let pending = credential
            .as_recoverable_mut()
            .ok_or(PasswordError::NotRecoverable)?
            .recovery_token();
        let matches = pending.as_ref().is_some_and(|stored| {
            !token.is_empty() && stored.is_valid_at(Utc::now()) && tokens_match(stored.token(), token)
        });
        if !matches {
            tracing::debug!("password reset token rejected");
            return Err(PasswordError::BadToken);
        }
        self.check_policy(new)?;
        let hashed = credential.hasher().hash(new)?;

        let previous_hash = credential.hashed_password().to_string();
        credential.set_hashed_password(hashed);
        put_token(credential, None);
        if let Err(err) = self.source.save(credential) {
            credential.set_hashed_password(previous_hash);
            put_token(credential, pending);
            return Err(err.into());
        }
        tracing::debug!("password reset confirmed");
        counter!(PASSWORD_RESET_CONFIRMED).increment(1);
        Ok(())
    }

    /// Ban the credential from logging in, for `length` or permanently when
    /// `None`. Replaces any earlier ban.
    pub fn punish(
        &self,
        credential: &mut dyn Credential,
        length: Option<Duration>,
        reason: Option<String>,
        punished_by: Option<&dyn Credential>,
    ) -> Result<(), PunishError> {
        let record = PunishmentRecord::new(Utc::now(), length, reason, punished_by.map(CredentialRef::of));
        self.replace_punishment(credential, Some(record))?;
        tracing::debug!(permanent = length.is_none(), "credential punished");
        counter!(CREDENTIAL_PUNISHED).increment(1);
        Ok(())
    }

    /// Lift any ban.
    pub fn pardon(&self, credential: &mut dyn Credential) -> Result<(), PunishError> {
        self.replace_punishment(credential, None)?;
        tracing::debug!("credential pardoned");
        Ok(())
    }

    fn check_policy(&self, password: &str) -> Result<(), PasswordError> {
        match &self.password_policy {
            Some(requirements) if !validate_password_strength(password, requirements) => {
                Err(PasswordError::TooWeak)
            },
            _ => Ok(()),
        }
    }

    fn replace_hash(&self, credential: &mut dyn Credential, hashed: String) -> Result<(), SourceError> {
        let previous = credential.hashed_password().to_string();
        credential.set_hashed_password(hashed);
        if let Err(err) = self.source.save(credential) {
            credential.set_hashed_password(previous);
            return Err(err);
        }
        Ok(())
    }

    fn replace_punishment(
        &self,
        credential: &mut dyn Credential,
        record: Option<PunishmentRecord>,
    ) -> Result<(), PunishError> {
        let previous = {
            let punishable = credential.as_punishable_mut().ok_or(PunishError::NotPunishable)?;
            let previous = punishable.punishment().cloned();
            punishable.set_punishment(record);
            previous
        };
        if let Err(err) = self.source.save(credential) {
            if let Some(punishable) = credential.as_punishable_mut() {
                punishable.set_punishment(previous);
            }
            return Err(err.into());
        }
        Ok(())
    }
}

fn put_token(credential: &mut dyn Credential, token: Option<RecoveryToken>) {
    if let Some(recoverable) = credential.as_recoverable_mut() {
        recoverable.set_recovery_token(token);
    }
}
