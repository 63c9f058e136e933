//! Named groups of realms.
use super::Realm;
use crate::credential::Credential;
use crate::error::{ConstructionError, LoginError, MultiRealmError, SourceError};
use identity_common::Index;
use std::collections::BTreeMap;

/// Realms addressed by name. Names are non-empty and unique. Scans across
/// realms go in name order.
#[derive(Debug)]
pub struct MultiRealm {
    realms: BTreeMap<String, Realm>,
}

impl MultiRealm {
    pub fn new<I, S>(realms: I) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = (S, Realm)>,
        S: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, realm) in realms {
            let name = name.into();
            if name.is_empty() {
                return Err(ConstructionError::EmptyRealmName);
            }
            if map.contains_key(&name) {
                return Err(ConstructionError::DuplicateRealm(name));
            }
            map.insert(name, realm);
        }
        Ok(Self { realms: map })
    }

    pub fn realm(&self, name: &str) -> Option<&Realm> {
        self.realms.get(name)
    }

    pub fn realm_names(&self) -> impl Iterator<Item = &str> {
        self.realms.keys().map(String::as_str)
    }

    /// Log in within `realm_name`, or, when it is empty, within whichever
    /// realm knows `identifier`. Returns the winning realm's name with the
    /// credential.
    ///
    /// An empty name looks `identifier` up in every realm, in name order,
    /// and runs the login pipeline only in the first realm that has it.
    pub fn login(
        &self,
        realm_name: &str,
        identifier: &str,
        password: &str,
    ) -> Result<(String, Box<dyn Credential>), MultiRealmError> {
        if !realm_name.is_empty() {
            let realm = self.get(realm_name)?;
            let _span = tracing::debug_span!("multi_realm_login", realm = realm_name).entered();
            let credential = realm.login(identifier, password)?;
            return Ok((realm_name.to_string(), credential));
        }

        let _span = tracing::debug_span!("multi_realm_scan").entered();
        let mut first_error: Option<SourceError> = None;
        for (name, realm) in &self.realms {
            match realm.by_identifier(identifier) {
                Ok(Some(credential)) => {
                    tracing::debug!(realm = %name, "credential found");
                    let credential = realm.authenticate(credential, password)?;
                    return Ok((name.clone(), credential));
                },
                Ok(None) => {},
                Err(err) => {
                    tracing::debug!(realm = %name, error = %err, "lookup failed");
                    first_error.get_or_insert(err);
                },
            }
        }

        if let Some(realm) = self.realms.values().next() {
            realm.run_dummy_pipeline(password);
        }
        Err(match first_error {
            Some(err) => LoginError::Lookup(err),
            None => LoginError::Failed,
        }
        .into())
    }

    /// Find `identifier` in one realm without authenticating.
    pub fn lookup(&self, realm_name: &str, identifier: &str) -> Result<Option<Box<dyn Credential>>, MultiRealmError> {
        Ok(self.get(realm_name)?.by_identifier(identifier)?)
    }

    /// Load a credential from its realm name and backend index, for example
    /// when restoring it from a session.
    pub fn unmarshal(&self, realm_name: &str, index: &Index) -> Result<Option<Box<dyn Credential>>, MultiRealmError> {
        Ok(self.get(realm_name)?.by_index(index)?)
    }

    pub fn save(&self, realm_name: &str, credential: &dyn Credential) -> Result<(), MultiRealmError> {
        Ok(self.get(realm_name)?.source().save(credential)?)
    }

    pub fn delete(&self, realm_name: &str, credential: &dyn Credential) -> Result<(), MultiRealmError> {
        Ok(self.get(realm_name)?.source().delete(credential)?)
    }

    fn get(&self, name: &str) -> Result<&Realm, MultiRealmError> {
        self.realms
            .get(name)
            .ok_or_else(|| MultiRealmError::InvalidRealm(name.to_string()))
    }
}
