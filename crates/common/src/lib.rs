// ================
// common/src/lib.rs
// ================
//! Common value types shared by the identity engine and its tooling.
//! These are plain data: permission tags (`Scope`), the set a credential
//! holds (`ScopeSet`) and the backend-assigned credential key (`Index`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// An atomic permission tag.
///
/// Scopes are compared and hashed by `key` only: two scopes with the same key
/// are the same permission even if their display data differs.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Scope {
    key: String,
    name: String,
    #[serde(default)]
    description: String,
}

impl Scope {
    /// Create a scope. `key` must be globally unique among the scopes of a deployment.
    pub fn new(key: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.key)
    }
}

/// Scopes granted to a credential, keyed by `Scope::key`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ScopeSet {
    scopes: BTreeMap<String, Scope>,
}

impl ScopeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a scope, replacing any scope with the same key.
    pub fn insert(&mut self, scope: Scope) -> Option<Scope> {
        self.scopes.insert(scope.key.clone(), scope)
    }

    pub fn remove(&mut self, key: &str) -> Option<Scope> {
        self.scopes.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.scopes.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Scope> {
        self.scopes.get(key)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.values()
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<I: IntoIterator<Item = Scope>>(iter: I) -> Self {
        let mut set = ScopeSet::new();
        for scope in iter {
            set.insert(scope);
        }
        set
    }
}

/// Backend-assigned key of a persisted credential.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum Index {
    Number(u64),
    Uuid(Uuid),
    Text(String),
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Index::Number(n) => write!(f, "{n}"),
            Index::Uuid(u) => write!(f, "{u}"),
            Index::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Index {
    fn from(n: u64) -> Self {
        Index::Number(n)
    }
}

impl From<Uuid> for Index {
    fn from(u: Uuid) -> Self {
        Index::Uuid(u)
    }
}

impl From<&str> for Index {
    fn from(s: &str) -> Self {
        Index::Text(s.to_string())
    }
}

impl From<String> for Index {
    fn from(s: String) -> Self {
        Index::Text(s)
    }
}
