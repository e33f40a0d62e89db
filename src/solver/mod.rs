//! This module contains the interface through which recorded constraints
//! are handed to a satisfiability solver.
//!
//! The tracer itself never decides anything: it records. Deciding whether a
//! recorded path is feasible, or whether an assertion can fail, is the job
//! of a back-end implementing [`Solver`]. Back-ends are consumed as
//! [`DynSolver`] trait objects so hosts can swap the decision procedure
//! without touching tracing code; the crate ships [`ground::GroundSolver`]
//! as its reference back-end.
//!
//! Encoding is compositional and deterministic: a [`Term`] is produced per
//! DAG root, and handing the same root to the same back-end twice yields
//! interchangeable terms.

pub mod ground;

use std::{
    any::Any,
    fmt::{Debug, Display, Formatter},
};

use downcast_rs::Downcast;
use serde::{Deserialize, Serialize};

use crate::{
    constant::{DEFAULT_MACRO_FINDER, DEFAULT_MBQI_MAX_ITERATIONS},
    error::solver,
    value::SharedRead,
};

/// An assertion term as encoded by a back-end.
///
/// Terms are opaque to callers: they carry the read instruction they encode
/// and whatever meaning a back-end attaches to it.
#[derive(Clone, Debug)]
pub struct Term {
    read: SharedRead,
}

impl Term {
    /// Constructs a new term encoding `read`.
    #[must_use]
    pub fn new(read: SharedRead) -> Self {
        Self { read }
    }

    /// Gets the read instruction this term encodes.
    #[must_use]
    pub fn read(&self) -> &SharedRead {
        &self.read
    }
}

/// The verdict of a satisfiability check.
///
/// `Unknown` is an expected, in-band verdict: a back-end that cannot decide
/// an assertion set within its means says so, and the caller chooses what
/// to do about it. Nothing in this crate retries on `Unknown`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Satisfiability {
    /// The asserted set has a model.
    Sat,

    /// The asserted set has no model.
    Unsat,

    /// The back-end could not decide the asserted set.
    Unknown,
}

impl Display for Satisfiability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sat => write!(f, "sat"),
            Self::Unsat => write!(f, "unsat"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// The configuration handed to solver back-ends.
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether definitional equalities (a variable equated with a literal)
    /// are propagated as forced bindings before any search.
    ///
    /// Defaults to [`DEFAULT_MACRO_FINDER`].
    pub macro_finder: bool,

    /// The maximum number of candidate assignments a back-end may evaluate
    /// while searching for a witness.
    ///
    /// Defaults to [`DEFAULT_MBQI_MAX_ITERATIONS`].
    pub mbqi_max_iterations: usize,
}

impl Config {
    /// Sets the `macro_finder` config parameter to `value`.
    #[must_use]
    pub fn with_macro_finder(mut self, value: bool) -> Self {
        self.macro_finder = value;
        self
    }

    /// Sets the `mbqi_max_iterations` config parameter to `value`.
    #[must_use]
    pub fn with_mbqi_max_iterations(mut self, value: usize) -> Self {
        self.mbqi_max_iterations = value;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        let macro_finder = DEFAULT_MACRO_FINDER;
        let mbqi_max_iterations = DEFAULT_MBQI_MAX_ITERATIONS;
        Self {
            macro_finder,
            mbqi_max_iterations,
        }
    }
}

/// The interface to a satisfiability back-end.
///
/// A back-end accumulates boolean assertions and decides them on demand.
/// There is no push/pop discipline at this seam; a host wanting incremental
/// queries builds a fresh back-end per query set.
pub trait Solver
where
    Self: Any + Debug + Downcast,
{
    /// Encodes `read` as a term of this back-end.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if this back-end cannot encode the given DAG.
    fn term_of(&mut self, read: &SharedRead) -> solver::Result<Term>;

    /// Asserts `term`, constraining every later [`Self::check`].
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `term` is not boolean.
    fn add(&mut self, term: Term) -> solver::Result<()>;

    /// Decides the conjunction of every added assertion.
    #[must_use]
    fn check(&mut self) -> Satisfiability;
}

/// A dynamically dispatched [`Solver`] instance.
pub type DynSolver = Box<dyn Solver>;
