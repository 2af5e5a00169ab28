use std::collections::HashMap;

use crate::registry::DuplicatePolicy;
use crate::registry::error::RegistryError;

/// Name-keyed storage that remembers insertion order.
#[derive(Debug, Clone)]
pub(crate) struct Table<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Table<T> {
    /// Insert `value` under `name`. Returns the replaced value, if any.
    pub(crate) fn insert(
        &mut self,
        name: String,
        value: T,
        policy: DuplicatePolicy,
    ) -> Result<Option<T>, RegistryError> {
        match self.index.get(&name) {
            Some(&slot) => match policy {
                DuplicatePolicy::Reject => Err(RegistryError::DuplicateName(name)),
                // Replacing keeps the original position in definition order.
                DuplicatePolicy::Replace => {
                    Ok(Some(std::mem::replace(&mut self.entries[slot].1, value)))
                }
            },
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
                Ok(None)
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&slot| &self.entries[slot].1)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}
