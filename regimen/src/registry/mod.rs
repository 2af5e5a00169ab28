mod error;
mod table;

pub use error::RegistryError;

use crate::block::Block;
use crate::regime::Regime;
use crate::registry::table::Table;

/// What to do when a definition reuses a registered name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with [`RegistryError::DuplicateName`].
    #[default]
    Reject,
    /// The later definition wins.
    Replace,
}

/// Atomic units by name, in definition order.
#[derive(Debug, Clone, Default)]
pub struct RegimeRegistry {
    table: Table<Regime>,
}

impl RegimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `regime`. Returns the definition it replaced under
    /// [`DuplicatePolicy::Replace`].
    pub fn insert(
        &mut self,
        regime: Regime,
        policy: DuplicatePolicy,
    ) -> Result<Option<Regime>, RegistryError> {
        self.table.insert(regime.name.clone(), regime, policy)
    }

    pub fn get(&self, name: &str) -> Result<&Regime, RegistryError> {
        self.table
            .get(name)
            .ok_or_else(|| RegistryError::UndefinedReference(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Regime> {
        self.table.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.names()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }
}

/// Blocks by name, in registration order. Synthetic group blocks are
/// registered before the definition that contains them.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    table: Table<Block>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        block: Block,
        policy: DuplicatePolicy,
    ) -> Result<Option<Block>, RegistryError> {
        self.table.insert(block.name.clone(), block, policy)
    }

    pub fn get(&self, name: &str) -> Result<&Block, RegistryError> {
        self.table
            .get(name)
            .ok_or_else(|| RegistryError::UndefinedReference(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains(name)
    }

    /// Look `name` up as a leaf. Blocks never store the regime registry;
    /// callers hand it in.
    pub fn resolve_leaf<'r>(&self, name: &str, regimes: &'r RegimeRegistry) -> Option<&'r Regime> {
        regimes.get(name).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.table.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.table.names()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }
}
