//! This module contains the bounded loop unwinder.
//!
//! Concolic tracing cannot follow a loop symbolically forever, so loops are
//! unwound: each concretely-taken iteration runs under its own guard, and
//! the state a loop variable reaches is joined with the state it had before
//! the iteration, selected by that guard. After `N` taken iterations a
//! variable's expression is an `N`-deep chain of ternary selections whose
//! ultimate fallthrough is the pre-loop value, which is exactly the
//! "executed at most `N` times" reading a solver needs.
//!
//! The expected bracketing, for a host loop over one state variable, is:
//!
//! ```
//! use concolic_tracer::{
//!     tracer::Tracer,
//!     unwind::Unwinder,
//!     value::sym::Sym,
//! };
//!
//! let mut tracer = Tracer::default();
//! let mut k = tracer.fresh_symbolic(0);
//!
//! let mut unwinder = Unwinder::new(3);
//! while unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10))) {
//!     unwinder.begin_loop(&k);
//!     k.assign(k.sym().clone() + 1);
//!     unwinder.end_loop(&mut k);
//! }
//! unwinder.join(&mut tracer);
//!
//! assert_eq!(unwinder.iterations(), 3);
//! assert_eq!(k.concrete(), 3);
//! ```
//!
//! Iteration guards are scoped to the path-condition *stack*: each taken
//! iteration pushes its guard, and the guard pops when the next `unwind`
//! call (or `join`) closes the iteration. Guards are never appended to the
//! tracer's constraint *log*, which records host branch decisions only;
//! [`Unwinder::guards`] exposes them for callers that want to assert "all
//! iterations ran" to a solver.

use std::collections::HashMap;

use crate::{
    constant::DEFAULT_LOOP_BOUND,
    registry::VariableId,
    tracer::{Tracer, Variable},
    value::{
        sym::{Sym, Symbolic},
        SharedRead,
    },
};

/// The unwinder for one host loop.
///
/// An unwinder is single-use: it drives one loop to its join and is sealed
/// afterwards. Using a sealed unwinder is a bug in the host program and
/// panics.
#[derive(Debug)]
pub struct Unwinder {
    /// The maximum number of iterations that will be taken.
    bound: usize,

    /// The number of iterations taken so far.
    taken: usize,

    /// Whether [`Unwinder::join`] has sealed this unwinder.
    joined: bool,

    /// The guard of the iteration currently in flight, if one is.
    current_guard: Option<SharedRead>,

    /// The pre-iteration expression of each variable snapshotted by
    /// [`Unwinder::begin_loop`] during the iteration in flight.
    snapshots: HashMap<VariableId, SharedRead>,

    /// The guards of the taken iterations, in iteration order.
    guards: Vec<SharedRead>,
}

impl Unwinder {
    /// Constructs a new unwinder that takes at most `bound` iterations.
    #[must_use]
    pub fn new(bound: usize) -> Self {
        Self {
            bound,
            taken: 0,
            joined: false,
            current_guard: None,
            snapshots: HashMap::new(),
            guards: Vec::new(),
        }
    }

    /// Decides whether the loop guarded by `condition` takes another
    /// iteration, closing the previous iteration first if one is open.
    ///
    /// An iteration is taken when `condition` is concretely true and the
    /// bound has not been reached. Taking an iteration pushes `condition`'s
    /// read onto `tracer`'s path-condition stack, where it stays until this
    /// iteration is closed.
    ///
    /// # Panics
    ///
    /// Panics if this unwinder has been sealed by [`Unwinder::join`].
    pub fn unwind(&mut self, tracer: &mut Tracer, condition: &Sym<bool>) -> bool {
        assert!(!self.joined, "The unwinder was used after join");
        self.close_iteration(tracer);

        if !condition.concrete() || self.taken == self.bound {
            return false;
        }

        let guard = condition.read().clone();
        tracer.path_mut().push(guard.clone());
        self.current_guard = Some(guard.clone());
        self.guards.push(guard);
        self.taken += 1;

        true
    }

    /// Snapshots `variable`'s pre-iteration expression so that
    /// [`Unwinder::end_loop`] can join against it. Call once per state
    /// variable per iteration, before the body touches the variable.
    ///
    /// # Panics
    ///
    /// Panics if this unwinder has been sealed by [`Unwinder::join`].
    pub fn begin_loop<T: Symbolic>(&mut self, variable: &Variable<T>) {
        assert!(!self.joined, "The unwinder was used after join");
        self.snapshots.insert(variable.id(), variable.sym().read().clone());
    }

    /// Joins `variable`'s post-body expression with its pre-iteration
    /// snapshot under the current iteration's guard, writing the selection
    /// back into the variable.
    ///
    /// # Panics
    ///
    /// Panics if this unwinder has been sealed by [`Unwinder::join`], if no
    /// iteration is in flight, or if `variable` has no matching
    /// [`Unwinder::begin_loop`] snapshot in this iteration.
    pub fn end_loop<T: Symbolic>(&mut self, variable: &mut Variable<T>) {
        assert!(!self.joined, "The unwinder was used after join");

        let snapshot = self
            .snapshots
            .remove(&variable.id())
            .expect("end_loop was called without a matching begin_loop");
        let guard = self
            .current_guard
            .clone()
            .expect("end_loop was called outside an unwound iteration");

        // The snapshot was taken from this same variable, so its sort is
        // T's sort.
        let joined = Sym::ite(
            &Sym::from_raw(guard),
            variable.sym(),
            &Sym::from_raw(snapshot),
        );
        variable.assign(joined);
    }

    /// Seals the unwinder, closing any iteration still in flight.
    ///
    /// The chained value accumulated by [`Unwinder::end_loop`] already
    /// carries the pre-loop expression as its ultimate fallthrough, so
    /// sealing is bookkeeping only; no further node is built.
    ///
    /// # Panics
    ///
    /// Panics if this unwinder has already been sealed.
    pub fn join(&mut self, tracer: &mut Tracer) {
        assert!(!self.joined, "The unwinder was already joined");
        self.close_iteration(tracer);
        self.joined = true;
    }

    /// Gets the guards of the taken iterations, in iteration order.
    #[must_use]
    pub fn guards(&self) -> &[SharedRead] {
        &self.guards
    }

    /// Gets the number of iterations taken so far.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.taken
    }

    /// Gets the maximum number of iterations this unwinder will take.
    #[must_use]
    pub fn bound(&self) -> usize {
        self.bound
    }

    fn close_iteration(&mut self, tracer: &mut Tracer) {
        if self.current_guard.take().is_some() {
            tracer.path_mut().pop();
        }
        self.snapshots.clear();
    }
}

/// The default unwinder takes at most [`DEFAULT_LOOP_BOUND`] iterations.
impl Default for Unwinder {
    fn default() -> Self {
        Self::new(DEFAULT_LOOP_BOUND)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        tracer::Tracer,
        unwind::Unwinder,
        value::sym::Sym,
    };

    #[test]
    fn unwinding_builds_selection_chains_up_to_the_bound() {
        let mut tracer = Tracer::default();
        let mut k = tracer.fresh_symbolic(0);

        let mut unwinder = Unwinder::new(2);
        while unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10))) {
            unwinder.begin_loop(&k);
            k.assign(k.sym().clone() + 1);
            unwinder.end_loop(&mut k);
        }
        unwinder.join(&mut tracer);

        let base = "[Var_0:0]";
        let first_guard = format!("({base}<10)");
        let after_first = format!("({first_guard}?({base}+1):{base})");
        let second_guard = format!("({after_first}<10)");
        let after_second = format!("({second_guard}?({after_first}+1):{after_first})");

        assert_eq!(unwinder.iterations(), 2);
        assert_eq!(k.sym().read().to_string(), after_second);
        assert_eq!(k.concrete(), 2);

        let guards: Vec<String> = unwinder.guards().iter().map(ToString::to_string).collect();
        assert_eq!(guards, vec![first_guard, second_guard]);
    }

    #[test]
    fn concretely_false_conditions_take_no_iterations() {
        let mut tracer = Tracer::default();
        let mut k = tracer.fresh_symbolic(12);

        let mut unwinder = Unwinder::new(8);
        while unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10))) {
            unwinder.begin_loop(&k);
            k.assign(k.sym().clone() + 1);
            unwinder.end_loop(&mut k);
        }
        unwinder.join(&mut tracer);

        assert_eq!(unwinder.iterations(), 0);
        assert!(unwinder.guards().is_empty());
        assert_eq!(k.sym().read().to_string(), "[Var_0:12]");
    }

    #[test]
    fn iteration_guards_scope_the_path_condition() {
        let mut tracer = Tracer::default();
        let mut k = tracer.fresh_symbolic(0);
        let mut unwinder = Unwinder::new(2);

        assert!(unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10))));
        assert_eq!(tracer.path().len(), 1);
        assert_eq!(tracer.path().top().unwrap().to_string(), "([Var_0:0]<10)");

        unwinder.begin_loop(&k);
        k.assign(k.sym().clone() + 1);
        unwinder.end_loop(&mut k);

        assert!(unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10))));
        assert_eq!(tracer.path().len(), 1);

        unwinder.begin_loop(&k);
        k.assign(k.sym().clone() + 1);
        unwinder.end_loop(&mut k);

        assert!(!unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10))));
        unwinder.join(&mut tracer);

        assert!(tracer.path().is_empty());
    }

    #[test]
    fn several_state_variables_join_under_the_same_guard() {
        let mut tracer = Tracer::default();
        let mut k = tracer.fresh_symbolic(0);
        let mut total = tracer.fresh_symbolic(5);

        let mut unwinder = Unwinder::new(1);
        while unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10))) {
            unwinder.begin_loop(&k);
            unwinder.begin_loop(&total);
            k.assign(k.sym().clone() + 1);
            total.assign(total.sym().clone() + 2);
            unwinder.end_loop(&mut k);
            unwinder.end_loop(&mut total);
        }
        unwinder.join(&mut tracer);

        assert_eq!(
            k.sym().read().to_string(),
            "(([Var_0:0]<10)?([Var_0:0]+1):[Var_0:0])"
        );
        assert_eq!(
            total.sym().read().to_string(),
            "(([Var_0:0]<10)?([Var_1:5]+2):[Var_1:5])"
        );
        assert_eq!(k.concrete(), 1);
        assert_eq!(total.concrete(), 7);
    }

    #[test]
    #[should_panic(expected = "The unwinder was used after join")]
    fn unwinding_after_join_panics() {
        let mut tracer = Tracer::default();
        let k = tracer.fresh_symbolic(0);

        let mut unwinder = Unwinder::new(1);
        unwinder.join(&mut tracer);
        unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10)));
    }

    #[test]
    #[should_panic(expected = "end_loop was called without a matching begin_loop")]
    fn ending_a_loop_without_beginning_one_panics() {
        let mut tracer = Tracer::default();
        let mut k = tracer.fresh_symbolic(0);

        let mut unwinder = Unwinder::new(1);
        assert!(unwinder.unwind(&mut tracer, &k.sym().lt(&Sym::from(10))));
        unwinder.end_loop(&mut k);
    }

    #[test]
    #[should_panic(expected = "The unwinder was already joined")]
    fn joining_twice_panics() {
        let mut tracer = Tracer::default();
        let mut unwinder = Unwinder::new(1);
        unwinder.join(&mut tracer);
        unwinder.join(&mut tracer);
    }
}
