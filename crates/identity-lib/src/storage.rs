// ============================
// identity-lib/src/storage.rs
// ============================
//! Persistence broker abstraction with an in-memory implementation.
use crate::credential::Credential;
use crate::error::BrokerError;
use identity_common::Index;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Trait for persistence backends.
///
/// A broker may serve several credential types; the `template` argument tells
/// it which one is wanted. Brokers load and save existing credentials, they
/// do not create them.
pub trait Broker: Send + Sync {
    /// Whether this broker can store credentials shaped like `template`.
    fn allows(&self, template: &dyn Credential) -> bool;

    /// Find by login identifier. `Ok(None)` means not found.
    fn by_identifier(
        &self,
        identifier: &str,
        template: &dyn Credential,
    ) -> Result<Option<Box<dyn Credential>>, BrokerError>;

    /// Find by backend index. `Ok(None)` means not found.
    fn by_index(
        &self,
        index: &Index,
        template: &dyn Credential,
    ) -> Result<Option<Box<dyn Credential>>, BrokerError>;

    /// Write back an existing credential.
    fn save(&self, credential: &dyn Credential) -> Result<(), BrokerError>;

    fn delete(&self, credential: &dyn Credential) -> Result<(), BrokerError>;
}

#[derive(Default)]
struct Table {
    by_index: BTreeMap<Index, Box<dyn Credential>>,
    identifiers: HashMap<String, Index>,
}

/// In-memory broker. Tables exist per credential type; a type must be
/// registered before sources for it can be built.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    tables: Arc<RwLock<HashMap<TypeId, Table>>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the table for credentials of type `C`.
    pub fn register<C: Credential>(&self) -> &Self {
        self.tables.write().entry(TypeId::of::<C>()).or_default();
        self
    }

    /// Store a new credential, registering its type if needed.
    pub fn insert(&self, credential: Box<dyn Credential>) -> Result<(), BrokerError> {
        let index = credential
            .index()
            .ok_or_else(|| BrokerError::NotStored("credentials need an index to be stored".to_string()))?;
        let identifier = credential.identifier().to_string();

        let mut tables = self.tables.write();
        let table = tables.entry(credential.concrete_type_id()).or_default();
        if table.by_index.contains_key(&index) {
            return Err(BrokerError::Conflict(format!("index {index} is taken")));
        }
        if table.identifiers.contains_key(&identifier) {
            return Err(BrokerError::Conflict(format!("identifier {identifier} is taken")));
        }
        table.identifiers.insert(identifier, index.clone());
        table.by_index.insert(index, credential);
        Ok(())
    }

    /// Number of stored credentials of type `C`.
    pub fn count<C: Credential>(&self) -> usize {
        self.tables
            .read()
            .get(&TypeId::of::<C>())
            .map_or(0, |table| table.by_index.len())
    }
}

impl Broker for MemoryBroker {
    fn allows(&self, template: &dyn Credential) -> bool {
        self.tables.read().contains_key(&template.concrete_type_id())
    }

    fn by_identifier(
        &self,
        identifier: &str,
        template: &dyn Credential,
    ) -> Result<Option<Box<dyn Credential>>, BrokerError> {
        let tables = self.tables.read();
        let found = tables.get(&template.concrete_type_id()).and_then(|table| {
            table
                .identifiers
                .get(identifier)
                .and_then(|index| table.by_index.get(index))
                .map(|credential| credential.clone_credential())
        });
        Ok(found)
    }

    fn by_index(
        &self,
        index: &Index,
        template: &dyn Credential,
    ) -> Result<Option<Box<dyn Credential>>, BrokerError> {
        let tables = self.tables.read();
        Ok(tables
            .get(&template.concrete_type_id())
            .and_then(|table| table.by_index.get(index))
            .map(|credential| credential.clone_credential()))
    }

    fn save(&self, credential: &dyn Credential) -> Result<(), BrokerError> {
        let index = credential
            .index()
            .ok_or_else(|| BrokerError::NotStored(credential.identifier().to_string()))?;
        let identifier = credential.identifier();

        let mut tables = self.tables.write();
        let table = tables
            .get_mut(&credential.concrete_type_id())
            .ok_or_else(|| BrokerError::NotStored(credential.type_name().to_string()))?;
        if let Some(owner) = table.identifiers.get(identifier) {
            if *owner != index {
                return Err(BrokerError::Conflict(format!("identifier {identifier} is taken")));
            }
        }
        let slot = table
            .by_index
            .get_mut(&index)
            .ok_or_else(|| BrokerError::NotStored(format!("index {index}")))?;
        if slot.identifier() != identifier {
            table.identifiers.remove(slot.identifier());
            table.identifiers.insert(identifier.to_string(), index.clone());
        }
        *slot = credential.clone_credential();
        Ok(())
    }

    fn delete(&self, credential: &dyn Credential) -> Result<(), BrokerError> {
        let index = credential
            .index()
            .ok_or_else(|| BrokerError::NotStored(credential.identifier().to_string()))?;
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(&credential.concrete_type_id())
            .ok_or_else(|| BrokerError::NotStored(credential.type_name().to_string()))?;
        let removed = table
            .by_index
            .remove(&index)
            .ok_or_else(|| BrokerError::NotStored(format!("index {index}")))?;
        table.identifiers.remove(removed.identifier());
        Ok(())
    }
}
