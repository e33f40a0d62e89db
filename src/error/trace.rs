//! This module contains errors pertaining to the recording surface of the
//! tracer.

use thiserror::Error;

use crate::{error::container, registry::VariableId, value::Sort};

/// Errors that occur while the tracer records constraints and events on
/// behalf of the host program.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("No variable with id {id:?} is registered with this tracer")]
    UnknownVariable { id: VariableId },

    #[error("A guard of sort {found} cannot form a path constraint; guards must be boolean")]
    GuardNotBoolean { found: Sort },
}

/// A tracing error with an associated position in the event sequence.
pub type LocatedError = container::Located<Error>;

/// The result type for methods that may have tracing errors.
pub type Result<T> = std::result::Result<T, LocatedError>;

/// Make it possible to attach positions to these errors.
impl container::Locatable for Error {
    type Located = LocatedError;

    fn locate(self, step: u64) -> Self::Located {
        container::Located {
            location: step,
            payload:  self,
        }
    }
}
