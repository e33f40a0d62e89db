//! This module contains errors pertaining to the solver back-end interface.

use thiserror::Error;

use crate::value::Sort;

/// Errors that occur at the boundary between the tracer and a solver
/// back-end.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("A term of sort {found} cannot be asserted; assertions must be boolean")]
    TermNotBoolean { found: Sort },

    #[error("The back-end could not encode the provided read instruction: {reason}")]
    CannotEncode { reason: String },
}

/// The result type for methods that may have solver-boundary errors.
pub type Result<T> = std::result::Result<T, Error>;
