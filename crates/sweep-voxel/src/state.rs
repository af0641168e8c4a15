//! Block state registry: maps compact [`BlockState`] ids to named [`StateDef`] metadata.
//!
//! Air is always id 0 so that zero-initialized index storage represents empty space.

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Compact identifier for a voxel state, stored in section palettes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockState(pub u16);

impl BlockState {
    /// The fixed state of every voxel in an empty section.
    pub const AIR: BlockState = BlockState(0);

    /// Returns `true` for the air state.
    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// Descriptor for a registered state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateDef {
    /// Human-readable name (e.g. "stone", "diamond_ore").
    pub name: String,
    /// Whether the state occupies its voxel physically.
    pub solid: bool,
}

impl StateDef {
    /// Shorthand for a solid state.
    pub fn solid(name: &str) -> Self {
        Self {
            name: name.to_string(),
            solid: true,
        }
    }
}

/// Errors that can occur during state registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A state with the same name has already been registered.
    #[error("duplicate block state name: {0}")]
    DuplicateName(String),
    /// Every `u16` id has been handed out.
    #[error("block state registry is full (max 65536 states)")]
    RegistryFull,
}

/// Maps [`BlockState`] → [`StateDef`] with O(1) lookup by id and by name.
pub struct StateRegistry {
    /// Dense array where `index == BlockState.0`.
    states: Vec<StateDef>,
    name_to_id: FxHashMap<String, BlockState>,
}

impl StateRegistry {
    /// Creates a new registry with air pre-registered as id 0.
    pub fn new() -> Self {
        let air = StateDef {
            name: "air".to_string(),
            solid: false,
        };

        let mut name_to_id = FxHashMap::default();
        name_to_id.insert(air.name.clone(), BlockState::AIR);

        Self {
            states: vec![air],
            name_to_id,
        }
    }

    /// Registers a new state and returns its assigned id.
    ///
    /// Ids are assigned sequentially starting from 1 (0 is air).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if a state with the same name
    /// already exists, or [`RegistryError::RegistryFull`] if all ids are used.
    pub fn register(&mut self, def: StateDef) -> Result<BlockState, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.states.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockState(self.states.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.states.push(def);
        Ok(id)
    }

    /// Returns the definition for a given id, or `None` for unknown ids.
    pub fn get(&self, id: BlockState) -> Option<&StateDef> {
        self.states.get(id.0 as usize)
    }

    /// Returns the name of a state, `"unknown"` for ids this registry never issued.
    pub fn name(&self, id: BlockState) -> &str {
        self.get(id).map_or("unknown", |def| def.name.as_str())
    }

    /// Returns the id for a named state, or `None` if not found.
    pub fn lookup(&self, name: &str) -> Option<BlockState> {
        self.name_to_id.get(name).copied()
    }

    /// Returns `true` if the state is registered as solid. Unknown ids are not solid.
    pub fn is_solid(&self, id: BlockState) -> bool {
        self.get(id).is_some_and(|def| def.solid)
    }

    /// Returns the total number of registered states (including air).
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if only air is registered.
    pub fn is_empty(&self) -> bool {
        self.states.len() <= 1
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_is_id_zero() {
        let registry = StateRegistry::new();
        assert_eq!(registry.lookup("air"), Some(BlockState::AIR));
        assert!(!registry.is_solid(BlockState::AIR));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_returns_sequential_ids() {
        let mut registry = StateRegistry::new();
        let stone = registry.register(StateDef::solid("stone")).unwrap();
        let dirt = registry.register(StateDef::solid("dirt")).unwrap();
        assert_eq!(stone, BlockState(1));
        assert_eq!(dirt, BlockState(2));
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.name(dirt), "dirt");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = StateRegistry::new();
        registry.register(StateDef::solid("stone")).unwrap();
        let result = registry.register(StateDef::solid("stone"));
        assert!(matches!(result, Err(RegistryError::DuplicateName(_))));
    }

    #[test]
    fn test_unknown_id_is_not_solid() {
        let registry = StateRegistry::new();
        assert!(!registry.is_solid(BlockState(500)));
        assert_eq!(registry.name(BlockState(500)), "unknown");
    }
}
