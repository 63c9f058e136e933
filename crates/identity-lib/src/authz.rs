// ============================
// identity-lib/src/authz.rs
// ============================
//! Authorization requirements.
//!
//! A requirement is a tree of conditions evaluated against an already
//! authenticated credential. Evaluation is pure and never fails: a
//! credential lacking the capability a leaf asks about simply does not
//! satisfy it.
use crate::credential::Credential;
use crate::error::AuthorizationError;
use identity_common::Scope;
use std::fmt;
use std::sync::Arc;

/// Extension point for conditions the built-in nodes cannot express.
pub trait AuthorizationRequirement: Send + Sync {
    fn satisfied_by(&self, credential: &dyn Credential) -> bool;
}

/// A node in a requirement tree.
#[derive(Clone)]
pub enum Requirement {
    /// The credential's scope set contains this scope's key.
    Scope(Scope),
    /// Every child is satisfied. Empty means satisfied.
    AllOf(Vec<Requirement>),
    /// At least one child is satisfied. Empty means unsatisfied.
    AnyOf(Vec<Requirement>),
    Superuser,
    Staff,
    Custom(Arc<dyn AuthorizationRequirement>),
}

impl Requirement {
    pub fn all<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Requirement>,
    {
        Requirement::AllOf(children.into_iter().map(Into::into).collect())
    }

    pub fn any<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Requirement>,
    {
        Requirement::AnyOf(children.into_iter().map(Into::into).collect())
    }

    /// Superusers, or staff members holding any of `scopes`.
    pub fn admin<I>(scopes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Requirement>,
    {
        Requirement::AnyOf(vec![
            Requirement::Superuser,
            Requirement::AllOf(vec![Requirement::Staff, Requirement::any(scopes)]),
        ])
    }

    pub fn custom<R: AuthorizationRequirement + 'static>(requirement: R) -> Self {
        Requirement::Custom(Arc::new(requirement))
    }

    /// Children are evaluated left to right and evaluation stops as soon as
    /// the outcome is known.
    pub fn satisfied_by(&self, credential: &dyn Credential) -> bool {
        match self {
            Requirement::Scope(scope) => scope.satisfied_by(credential),
            Requirement::AllOf(children) => children.iter().all(|child| child.satisfied_by(credential)),
            Requirement::AnyOf(children) => children.iter().any(|child| child.satisfied_by(credential)),
            Requirement::Superuser => credential.is_superuser(),
            Requirement::Staff => credential.is_staff(),
            Requirement::Custom(custom) => custom.satisfied_by(credential),
        }
    }
}

impl AuthorizationRequirement for Requirement {
    fn satisfied_by(&self, credential: &dyn Credential) -> bool {
        Requirement::satisfied_by(self, credential)
    }
}

/// A bare scope is a leaf: the credential's scope set must contain its key.
impl AuthorizationRequirement for Scope {
    fn satisfied_by(&self, credential: &dyn Credential) -> bool {
        credential
            .as_scoped()
            .is_some_and(|scoped| scoped.scopes().contains(self.key()))
    }
}

impl From<Scope> for Requirement {
    fn from(scope: Scope) -> Self {
        Requirement::Scope(scope)
    }
}

impl From<&Scope> for Requirement {
    fn from(scope: &Scope) -> Self {
        Requirement::Scope(scope.clone())
    }
}

impl fmt::Debug for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Scope(scope) => write!(f, "Scope({})", scope.key()),
            Requirement::AllOf(children) => f.debug_tuple("AllOf").field(children).finish(),
            Requirement::AnyOf(children) => f.debug_tuple("AnyOf").field(children).finish(),
            Requirement::Superuser => f.write_str("Superuser"),
            Requirement::Staff => f.write_str("Staff"),
            Requirement::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Check `credential` against an optional requirement. No requirement means
/// allowed. Superusers get no implicit pass; trees that should admit them say
/// so with `Requirement::Superuser` or `Requirement::admin`.
pub fn authorize(credential: &dyn Credential, requirement: Option<&Requirement>) -> Result<(), AuthorizationError> {
    match requirement {
        None => Ok(()),
        Some(requirement) if requirement.satisfied_by(credential) => Ok(()),
        Some(requirement) => {
            tracing::trace!(?requirement, "authorization denied");
            Err(AuthorizationError::Unauthorized)
        },
    }
}
