//! Credentials and their optional capabilities.
//!
//! A credential only has to carry a password hash, an identifier and a
//! hashing engine. Everything else (activity, superuser and staff flags,
//! scopes, punishments, password recovery) is an optional capability that
//! call sites probe through the `as_*` accessors, which default to `None`.

mod capabilities;
mod punishment;
mod recovery;

pub use capabilities::{Activable, Scoped, StaffCapable, SuperuserCapable};
pub use punishment::{Punishable, PunishedError, PunishmentRecord};
pub use recovery::{Recoverable, RecoverySlot, RecoveryToken};

use crate::hashing::HashingEngine;
use identity_common::Index;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Object-safety plumbing for credentials: downcasting, cloning and type
/// identity. Implemented for every `Credential + Clone`.
pub trait CredentialBase: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_credential(&self) -> Box<dyn Credential>;
    fn type_name(&self) -> &'static str;
}

impl<T> CredentialBase for T
where
    T: Credential + Clone,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_credential(&self) -> Box<dyn Credential> {
        Box::new(self.clone())
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// An identity record able to authenticate with a password.
pub trait Credential: CredentialBase {
    /// The login identifier (username, email, ...).
    fn identifier(&self) -> &str;

    /// Backend-assigned key. `None` for instances that were never persisted.
    fn index(&self) -> Option<Index>;

    /// Current hashed password. Empty means no password is set.
    fn hashed_password(&self) -> &str;

    fn set_hashed_password(&mut self, hashed: String);

    /// Engine used both to hash new passwords and to validate attempts.
    fn hasher(&self) -> Arc<dyn HashingEngine>;

    fn as_activable(&self) -> Option<&dyn Activable> {
        None
    }

    fn as_superuser(&self) -> Option<&dyn SuperuserCapable> {
        None
    }

    fn as_staff(&self) -> Option<&dyn StaffCapable> {
        None
    }

    fn as_scoped(&self) -> Option<&dyn Scoped> {
        None
    }

    fn as_punishable(&self) -> Option<&dyn Punishable> {
        None
    }

    fn as_punishable_mut(&mut self) -> Option<&mut dyn Punishable> {
        None
    }

    fn as_recoverable_mut(&mut self) -> Option<&mut dyn Recoverable> {
        None
    }
}

impl dyn Credential {
    /// Concrete type of the credential behind the trait object.
    pub fn concrete_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    pub fn downcast_ref<T: Credential>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Credential>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is_superuser(&self) -> bool {
        self.as_superuser().is_some_and(|c| c.is_superuser())
    }

    pub fn is_staff(&self) -> bool {
        self.as_staff().is_some_and(|c| c.is_staff())
    }
}

impl Clone for Box<dyn Credential> {
    fn clone(&self) -> Self {
        self.clone_credential()
    }
}

impl fmt::Debug for dyn Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.type_name())
            .field("identifier", &self.identifier())
            .field("index", &self.index())
            .finish_non_exhaustive()
    }
}

/// Two credentials are the same when they share a concrete type and a
/// backend index. Never-persisted credentials are only equal to themselves.
pub fn same_credential(a: &dyn Credential, b: &dyn Credential) -> bool {
    if a.concrete_type_id() != b.concrete_type_id() {
        return false;
    }
    match (a.index(), b.index()) {
        (Some(x), Some(y)) => x == y,
        _ => std::ptr::addr_eq(a as *const dyn Credential, b as *const dyn Credential),
    }
}

/// Weak reference to a credential: enough to name it and find it again,
/// without owning it.
#[derive(Clone)]
pub struct CredentialRef {
    type_id: TypeId,
    type_name: &'static str,
    index: Option<Index>,
    identifier: String,
}

impl CredentialRef {
    pub fn of(credential: &dyn Credential) -> Self {
        Self {
            type_id: credential.concrete_type_id(),
            type_name: credential.type_name(),
            index: credential.index(),
            identifier: credential.identifier().to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn index(&self) -> Option<&Index> {
        self.index.as_ref()
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Whether this reference points at `credential`.
    pub fn refers_to(&self, credential: &dyn Credential) -> bool {
        self.type_id == credential.concrete_type_id()
            && match (&self.index, credential.index()) {
                (Some(x), Some(y)) => *x == y,
                _ => self.identifier == credential.identifier(),
            }
    }
}

impl PartialEq for CredentialRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
            && match (&self.index, &other.index) {
                (Some(x), Some(y)) => x == y,
                _ => self.identifier == other.identifier,
            }
    }
}

impl Eq for CredentialRef {}

impl fmt::Debug for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRef")
            .field("type_name", &self.type_name)
            .field("index", &self.index)
            .field("identifier", &self.identifier)
            .finish()
    }
}

impl fmt::Display for CredentialRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}
