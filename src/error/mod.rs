//! This module contains the primary error type for the tracer's interface.
//! It also re-exports the more specific error types that are
//! subsystem-specific.

pub mod container;
pub mod memory;
pub mod solver;
pub mod trace;
pub mod value;

use thiserror::Error;

/// The interface result type for the library.
///
/// # Usage
///
/// Any function considered to be part of the public interface of the library
/// should return this result type. Subsystems should return the more-specific
/// child error types as appropriate.
///
/// Note that _all_ of the library is public in order to facilitate use-cases
/// beyond the ones designed for.
pub type Result<T> = std::result::Result<T, Error>;

/// The interface error type for the library.
///
/// All errors returned from the library interface (and hence encountered by
/// the clients of the library) should be members of this enum.
#[derive(Clone, Debug, Error)]
pub enum Error {
    /// Errors from the construction of read-instruction DAGs.
    #[error(transparent)]
    Value(#[from] value::Error),

    /// Errors from the construction of abstract addresses.
    #[error(transparent)]
    Memory(#[from] memory::Error),

    /// Errors from the recording surface of the tracer, with their position
    /// in the event sequence.
    #[error(transparent)]
    Trace(#[from] trace::LocatedError),

    /// Errors from the solver back-end boundary.
    #[error(transparent)]
    Solver(#[from] solver::Error),

    /// An unknown error, represented as a string.
    #[error("Unknown Error: {_0:?}")]
    Other(String),
}

impl Error {
    /// Constructs an unknown error with the provided `message`.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Make it possible to attach event-sequence positions to these errors.
impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, step: u64) -> Self::Located {
        container::Located {
            location: step,
            payload:  self,
        }
    }
}

/// A library error with an associated position in the event sequence.
pub type LocatedError = container::Located<Error>;
