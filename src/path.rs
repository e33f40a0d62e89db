//! This module contains the path condition, the stack of branch guards that
//! scope the currently-executing path.
//!
//! A guard is pushed when execution enters the region it scopes and popped
//! when execution leaves it; the loop unwinder brackets each taken
//! iteration this way, and hosts can bracket regions of their own through
//! [`crate::tracer::Tracer::path_mut`]. The stack therefore reads, bottom
//! to top, as the conjunction of assumptions under which execution reached
//! the current point.
//!
//! The stack does not police its callers: popping more than was pushed is a
//! bug in the host program's bracketing, and surfaces as [`None`] rather
//! than as an error.

use crate::value::{BinaryOperator, ReadInstruction, SharedRead};

/// The stack of branch guards scoping the current execution path.
#[derive(Clone, Debug, Default)]
pub struct PathCondition {
    guards: Vec<SharedRead>,
}

impl PathCondition {
    /// Creates an empty path condition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `guard` as the innermost assumption of the current path.
    pub fn push(&mut self, guard: SharedRead) {
        self.guards.push(guard);
    }

    /// Pops the innermost assumption, returning [`None`] if the caller has
    /// already popped everything it pushed.
    pub fn pop(&mut self) -> Option<SharedRead> {
        self.guards.pop()
    }

    /// Gets the innermost assumption without popping it.
    #[must_use]
    pub fn top(&self) -> Option<&SharedRead> {
        self.guards.last()
    }

    /// Gets the guards in force, outermost first.
    #[must_use]
    pub fn guards(&self) -> &[SharedRead] {
        &self.guards
    }

    /// Folds the guards in force into one conjunction, outermost first,
    /// returning [`None`] when no guard is in force.
    ///
    /// All pushed guards are boolean reads, so the fold needs no sort
    /// checks.
    #[must_use]
    pub fn conjunction(&self) -> Option<SharedRead> {
        self.guards
            .iter()
            .cloned()
            .reduce(|acc, guard| {
                ReadInstruction::binary_unchecked(BinaryOperator::Land, acc, guard)
            })
    }

    /// Gets the number of guards in force.
    #[must_use]
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// Checks whether no guard is in force.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Drops every guard in force.
    pub fn clear(&mut self) {
        self.guards.clear();
    }
}
