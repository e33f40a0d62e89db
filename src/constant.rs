//! This module contains constants that are needed throughout the codebase.

/// The default prefix prepended to freshly-allocated symbolic variable names.
///
/// A fresh name is this prefix followed by the value of the monotonic
/// variable counter, so the first variable allocated by a tracer is `Var_0`.
pub const DEFAULT_VARIABLE_PREFIX: &str = "Var_";

/// The default for whether a solver back-end should treat definitional
/// equalities as macros and eliminate them before checking.
pub const DEFAULT_MACRO_FINDER: bool = true;

/// The default iteration budget handed to a solver back-end for model-based
/// quantifier instantiation, and honoured by the reference back-end as its
/// candidate-evaluation budget.
pub const DEFAULT_MBQI_MAX_ITERATIONS: usize = 1000;

/// The number of iterations a loop unwinder will drive a loop body through
/// when the caller does not supply a bound of its own.
pub const DEFAULT_LOOP_BOUND: usize = 65_536;

/// The version of a variable's very first read, frozen in at allocation.
pub const INITIAL_VERSION: u32 = 0;
