use super::HashingEngine;
use crate::error::{ConstructionError, HashingError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Separates the engine name from the engine's own hash: `<name>:<hash>`.
pub const TAG_SEPARATOR: char = ':';

/// Groups several engines. New hashes always come from the default engine and
/// are tagged with its name; validation dispatches on the tag.
pub struct MultiHashingEngine {
    default_engine: String,
    engines: HashMap<String, Arc<dyn HashingEngine>>,
}

impl MultiHashingEngine {
    /// Group `engines`, using the first one as default.
    pub fn new(engines: Vec<Arc<dyn HashingEngine>>) -> Result<Self, ConstructionError> {
        Self::build(None, engines)
    }

    /// Group `engines` with an explicit default, which must be one of the
    /// given engines (same instance, not just the same name).
    pub fn with_default(
        default: Arc<dyn HashingEngine>,
        engines: Vec<Arc<dyn HashingEngine>>,
    ) -> Result<Self, ConstructionError> {
        Self::build(Some(default), engines)
    }

    fn build(
        default: Option<Arc<dyn HashingEngine>>,
        engines: Vec<Arc<dyn HashingEngine>>,
    ) -> Result<Self, ConstructionError> {
        let first = engines.first().ok_or(ConstructionError::NoHashers)?;
        let first_name = first.name().to_string();

        let mut registered: HashMap<String, Arc<dyn HashingEngine>> = HashMap::with_capacity(engines.len());
        for engine in engines {
            if engine.is_multi() {
                return Err(ConstructionError::NestedMultiHasher);
            }
            let name = engine.name();
            if name.is_empty() {
                return Err(ConstructionError::EmptyHasherName);
            }
            // The tag is cut at the first separator, so the name must not hold one.
            if name.contains(TAG_SEPARATOR) {
                return Err(ConstructionError::InvalidHasherName(name.to_string()));
            }
            if registered.contains_key(name) {
                return Err(ConstructionError::DuplicateHasherName(name.to_string()));
            }
            registered.insert(name.to_string(), engine);
        }

        let default_engine = match default {
            None => first_name,
            Some(default) => {
                let name = default.name().to_string();
                match registered.get(&name) {
                    Some(engine) if Arc::ptr_eq(engine, &default) => name,
                    _ => return Err(ConstructionError::MissingDefault(name)),
                }
            },
        };

        Ok(Self {
            default_engine,
            engines: registered,
        })
    }

    pub fn default_engine(&self) -> &str {
        &self.default_engine
    }

    pub fn engine(&self, name: &str) -> Option<&Arc<dyn HashingEngine>> {
        self.engines.get(name)
    }

    /// Whether `hash` was not produced by the current default engine, i.e.
    /// should be rehashed on the next successful login.
    pub fn needs_rehash(&self, hash: &str) -> bool {
        match hash.split_once(TAG_SEPARATOR) {
            Some((name, _)) => name != self.default_engine,
            None => true,
        }
    }

    fn default(&self) -> &Arc<dyn HashingEngine> {
        // `build` guarantees the default is registered.
        &self.engines[&self.default_engine]
    }
}

impl HashingEngine for MultiHashingEngine {
    fn name(&self) -> &str {
        "multi"
    }

    fn hash(&self, password: &str) -> Result<String, HashingError> {
        let raw = self.default().hash(password)?;
        Ok(format!("{}{TAG_SEPARATOR}{raw}", self.default_engine))
    }

    /// Untagged hashes are validated by the default engine, so stores written
    /// before the group existed keep working.
    fn validate(&self, password: &str, hash: &str) -> Result<(), HashingError> {
        match hash.split_once(TAG_SEPARATOR) {
            Some((name, raw)) => self
                .engines
                .get(name)
                .ok_or_else(|| HashingError::UnregisteredEngine(name.to_string()))?
                .validate(password, raw),
            None => self.default().validate(password, hash),
        }
    }

    fn is_multi(&self) -> bool {
        true
    }
}

impl fmt::Debug for MultiHashingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("MultiHashingEngine")
            .field("default_engine", &self.default_engine)
            .field("engines", &names)
            .finish()
    }
}
