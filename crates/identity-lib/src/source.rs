//! Credential sources: a broker bound to one credential type.
use crate::credential::Credential;
use crate::error::{ConstructionError, SourceError};
use crate::storage::Broker;
use identity_common::Index;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Builds blank, never-persisted credentials of the source's type.
pub type CredentialFactory = Arc<dyn Fn() -> Box<dyn Credential> + Send + Sync>;

/// Couples a broker with a credential type. The factory doubles as the type
/// template and as the maker of dummy credentials for failed lookups.
#[derive(Clone)]
pub struct CredentialSource {
    broker: Arc<dyn Broker>,
    factory: CredentialFactory,
    template_type: TypeId,
    template_name: &'static str,
}

impl CredentialSource {
    /// Fails when the broker does not accept the factory's credential type.
    pub fn new<F>(broker: Arc<dyn Broker>, factory: F) -> Result<Self, ConstructionError>
    where
        F: Fn() -> Box<dyn Credential> + Send + Sync + 'static,
    {
        let template = factory();
        if !broker.allows(template.as_ref()) {
            return Err(ConstructionError::TemplateNotAllowed(template.type_name()));
        }
        Ok(Self {
            broker,
            template_type: template.concrete_type_id(),
            template_name: template.type_name(),
            factory: Arc::new(factory),
        })
    }

    /// Source for `C`, using `C::default()` as the template.
    pub fn of<C: Credential + Default>(broker: Arc<dyn Broker>) -> Result<Self, ConstructionError> {
        Self::new(broker, || Box::new(C::default()) as Box<dyn Credential>)
    }

    pub fn template_name(&self) -> &'static str {
        self.template_name
    }

    /// A fresh blank credential of the source's type. Never persisted.
    pub fn dummy(&self) -> Box<dyn Credential> {
        (self.factory)()
    }

    pub fn by_identifier(&self, identifier: &str) -> Result<Option<Box<dyn Credential>>, SourceError> {
        let template = self.dummy();
        let found = self.broker.by_identifier(identifier, template.as_ref())?;
        found.map(|c| self.check_type(c)).transpose()
    }

    pub fn by_index(&self, index: &Index) -> Result<Option<Box<dyn Credential>>, SourceError> {
        let template = self.dummy();
        let found = self.broker.by_index(index, template.as_ref())?;
        found.map(|c| self.check_type(c)).transpose()
    }

    pub fn save(&self, credential: &dyn Credential) -> Result<(), SourceError> {
        self.ensure_type(credential)?;
        Ok(self.broker.save(credential)?)
    }

    pub fn delete(&self, credential: &dyn Credential) -> Result<(), SourceError> {
        self.ensure_type(credential)?;
        Ok(self.broker.delete(credential)?)
    }

    fn ensure_type(&self, credential: &dyn Credential) -> Result<(), SourceError> {
        if credential.concrete_type_id() == self.template_type {
            Ok(())
        } else {
            Err(SourceError::TypeMismatch {
                expected: self.template_name,
                found: credential.type_name(),
            })
        }
    }

    fn check_type(&self, credential: Box<dyn Credential>) -> Result<Box<dyn Credential>, SourceError> {
        self.ensure_type(credential.as_ref())?;
        Ok(credential)
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSource")
            .field("template", &self.template_name)
            .finish_non_exhaustive()
    }
}
