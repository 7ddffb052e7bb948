use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::config::*;
use crate::normalize::{normalize_locality, LookupTables};

/// The canonical localities of the state, indexed by id and by normalized name.
///
/// The registry is built once from the boundary source and never changes afterwards.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LocalityRegistry {
    by_key: HashMap<String, LocalityId>,
    by_id: BTreeMap<LocalityId, CanonicalLocality>,
}

impl LocalityRegistry {
    /// Builds a registry from (id, display name) pairs.
    pub fn new<I, S1, S2>(localities: I) -> Result<LocalityRegistry, RegistryError>
    where
        I: IntoIterator<Item = (S1, S2)>,
        S1: Into<String>,
        S2: Into<String>,
    {
        let mut by_key: HashMap<String, LocalityId> = HashMap::new();
        let mut by_id: BTreeMap<LocalityId, CanonicalLocality> = BTreeMap::new();
        for (id, name) in localities {
            let id: LocalityId = id.into();
            let display_name: String = name.into();
            let key = normalize_locality(&display_name);
            if let Some(first) = by_key.get(&key) {
                return Err(RegistryError::DuplicateKey {
                    key,
                    first: first.clone(),
                    second: id,
                });
            }
            if by_id.contains_key(&id) {
                return Err(RegistryError::DuplicateId(id));
            }
            debug!("LocalityRegistry: {} -> {:?}", key, id);
            by_key.insert(key.clone(), id.clone());
            by_id.insert(
                id.clone(),
                CanonicalLocality {
                    id,
                    display_name,
                    key,
                },
            );
        }
        if by_id.is_empty() {
            return Err(RegistryError::Empty);
        }
        Ok(LocalityRegistry { by_key, by_id })
    }

    /// Looks up a normalized key. The alias table is not consulted.
    pub fn resolve(&self, key: &str) -> Option<&LocalityId> {
        self.by_key.get(key)
    }

    /// Looks up a normalized key after mapping historical localities to their successor.
    pub fn resolve_current(&self, key: &str, tables: &LookupTables) -> Option<&LocalityId> {
        self.resolve(tables.current_locality(key))
    }

    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(|l| l.display_name.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalLocality> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
