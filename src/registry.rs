//! This module contains the registry that allocates program variables for a
//! trace: fresh names, symbolic/concrete flags, and per-variable versions.

use std::collections::HashMap;

use bimap::BiMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{constant::INITIAL_VERSION, error::trace};

/// A unique identifier for a program variable within one tracer lifetime.
///
/// The identifier doubles as the numeric suffix of the variable's name, so
/// the variable named `Var_3` has id `3`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct VariableId(u64);

impl VariableId {
    /// Creates a variable id with the provided raw `id`.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

/// The registry's bookkeeping for a single variable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct VariableState {
    /// Whether future memory reads of the variable produce fresh basic nodes
    /// (symbolic) or literals of the stored value (concrete).
    symbolic: bool,

    /// The version of the variable's most recent read.
    version: u32,
}

/// The allocator and index for all variables known to a tracer.
///
/// Fresh names are the configured prefix followed by a monotonic counter;
/// they are unique within one tracer lifetime. [`VariableRegistry::reset`]
/// returns the counter to zero and forgets every variable, after which stale
/// ids are rejected.
#[derive(Clone, Debug)]
pub struct VariableRegistry {
    /// The prefix prepended to fresh names.
    prefix: String,

    /// The value of the monotonic name counter.
    next_id: u64,

    /// The bidirectional index between names and ids.
    names: BiMap<String, VariableId>,

    /// The per-variable bookkeeping.
    state: HashMap<VariableId, VariableState>,
}

impl VariableRegistry {
    /// Creates an empty registry allocating names under `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let next_id = 0;
        let names = BiMap::new();
        let state = HashMap::new();
        Self {
            prefix,
            next_id,
            names,
            state,
        }
    }

    /// Allocates the next fresh variable, yielding its id and name and
    /// advancing the counter.
    ///
    /// The new variable starts at the initial version with the provided
    /// `symbolic` flag.
    pub fn fresh_name(&mut self, symbolic: bool) -> (VariableId, String) {
        let id = VariableId::new(self.next_id);
        self.next_id += 1;

        let name = format!("{}{}", self.prefix, id.0);
        self.names.insert(name.clone(), id);
        self.state.insert(
            id,
            VariableState {
                symbolic,
                version: INITIAL_VERSION,
            },
        );

        (id, name)
    }

    /// Marks the variable `id` as symbolic, so its future memory reads
    /// produce fresh basic nodes.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `id` is not registered with this registry.
    pub fn set_symbolic(&mut self, id: VariableId) -> Result<(), trace::Error> {
        self.state_mut(id)?.symbolic = true;
        Ok(())
    }

    /// Marks the variable `id` as concrete, so its future memory reads
    /// produce literals of the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `id` is not registered with this registry.
    pub fn set_concrete(&mut self, id: VariableId) -> Result<(), trace::Error> {
        self.state_mut(id)?.symbolic = false;
        Ok(())
    }

    /// Checks whether the variable `id` is currently symbolic.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `id` is not registered with this registry.
    pub fn is_symbolic(&self, id: VariableId) -> Result<bool, trace::Error> {
        Ok(self.state(id)?.symbolic)
    }

    /// Gets the name of the variable `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `id` is not registered with this registry.
    pub fn name_of(&self, id: VariableId) -> Result<&str, trace::Error> {
        self.names
            .get_by_right(&id)
            .map(String::as_str)
            .ok_or(trace::Error::UnknownVariable { id })
    }

    /// Gets the id of the variable named `name`, if one exists.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.names.get_by_left(name).copied()
    }

    /// Gets the version of the most recent read of the variable `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `id` is not registered with this registry.
    pub fn version_of(&self, id: VariableId) -> Result<u32, trace::Error> {
        Ok(self.state(id)?.version)
    }

    /// Advances the version of the variable `id`, returning the new version.
    ///
    /// Memory reads call this so that every read event carries a distinct
    /// `(variable, version)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `id` is not registered with this registry.
    pub fn next_version(&mut self, id: VariableId) -> Result<u32, trace::Error> {
        let state = self.state_mut(id)?;
        state.version += 1;
        Ok(state.version)
    }

    /// Gets the number of variables currently registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Checks whether no variables are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    /// Gets every registered variable as `(id, name, symbolic)`, in
    /// allocation order.
    #[must_use]
    pub fn variables(&self) -> Vec<(VariableId, String, bool)> {
        self.state
            .iter()
            .sorted_by_key(|(id, _)| **id)
            .map(|(id, state)| {
                let name = self
                    .names
                    .get_by_right(id)
                    .cloned()
                    .unwrap_or_else(|| format!("{}{}", self.prefix, id.0));
                (*id, name, state.symbolic)
            })
            .collect()
    }

    /// Forgets every variable and returns the name counter to zero.
    pub fn reset(&mut self) {
        self.next_id = 0;
        self.names.clear();
        self.state.clear();
    }

    fn state(&self, id: VariableId) -> Result<&VariableState, trace::Error> {
        self.state.get(&id).ok_or(trace::Error::UnknownVariable { id })
    }

    fn state_mut(&mut self, id: VariableId) -> Result<&mut VariableState, trace::Error> {
        self.state
            .get_mut(&id)
            .ok_or(trace::Error::UnknownVariable { id })
    }
}

#[cfg(test)]
mod test {
    use crate::{
        constant::{DEFAULT_VARIABLE_PREFIX, INITIAL_VERSION},
        error::trace,
        registry::{VariableId, VariableRegistry},
    };

    #[test]
    fn fresh_names_carry_monotonic_suffixes() {
        let mut registry = VariableRegistry::new(DEFAULT_VARIABLE_PREFIX);

        let (first_id, first_name) = registry.fresh_name(true);
        let (second_id, second_name) = registry.fresh_name(true);

        assert_eq!(first_id, VariableId::new(0));
        assert_eq!(first_name, "Var_0");
        assert_eq!(second_id, VariableId::new(1));
        assert_eq!(second_name, "Var_1");
    }

    #[test]
    fn fresh_names_respect_the_configured_prefix() {
        let mut registry = VariableRegistry::new("input");
        let (_, name) = registry.fresh_name(true);

        assert_eq!(name, "input0");
    }

    #[test]
    fn reset_returns_the_counter_to_zero() {
        let mut registry = VariableRegistry::new(DEFAULT_VARIABLE_PREFIX);
        let (stale, _) = registry.fresh_name(true);
        registry.fresh_name(false);

        registry.reset();
        assert!(registry.is_empty());

        let (id, name) = registry.fresh_name(true);
        assert_eq!(id, VariableId::new(0));
        assert_eq!(name, "Var_0");

        // The pre-reset id of the same number resolves to the new variable;
        // nothing else about the old one survives.
        assert_eq!(registry.name_of(stale), Ok("Var_0"));
    }

    #[test]
    fn symbolic_and_concrete_flags_toggle() -> anyhow::Result<()> {
        let mut registry = VariableRegistry::new(DEFAULT_VARIABLE_PREFIX);
        let (id, _) = registry.fresh_name(true);
        assert!(registry.is_symbolic(id)?);

        registry.set_concrete(id)?;
        assert!(!registry.is_symbolic(id)?);

        registry.set_symbolic(id)?;
        assert!(registry.is_symbolic(id)?);

        Ok(())
    }

    #[test]
    fn versions_advance_from_the_initial_version() -> anyhow::Result<()> {
        let mut registry = VariableRegistry::new(DEFAULT_VARIABLE_PREFIX);
        let (id, _) = registry.fresh_name(true);

        assert_eq!(registry.version_of(id)?, INITIAL_VERSION);
        assert_eq!(registry.next_version(id)?, INITIAL_VERSION + 1);
        assert_eq!(registry.next_version(id)?, INITIAL_VERSION + 2);
        assert_eq!(registry.version_of(id)?, INITIAL_VERSION + 2);

        Ok(())
    }

    #[test]
    fn lookups_roundtrip_through_the_name_index() {
        let mut registry = VariableRegistry::new(DEFAULT_VARIABLE_PREFIX);
        let (id, name) = registry.fresh_name(true);

        assert_eq!(registry.id_of(&name), Some(id));
        assert_eq!(registry.name_of(id), Ok(name.as_str()));
        assert_eq!(registry.id_of("unregistered"), None);
    }

    #[test]
    fn operations_on_unknown_ids_are_rejected() {
        let mut registry = VariableRegistry::new(DEFAULT_VARIABLE_PREFIX);
        let missing = VariableId::new(42);

        assert_eq!(
            registry.set_symbolic(missing),
            Err(trace::Error::UnknownVariable { id: missing })
        );
        assert_eq!(
            registry.next_version(missing),
            Err(trace::Error::UnknownVariable { id: missing })
        );
    }
}
