use std::fmt::Formatter;

use thiserror::Error;

/// An error that is localised to a particular position in the tracer's event
/// sequence.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Located<E>
where
    E: Clone,
{
    /// The event-sequence position at which the error occurred.
    pub location: u64,

    /// The error data.
    pub payload: E,
}

/// Displays the error together with the event-sequence position at which it
/// occurred.
impl<E> std::fmt::Display for Located<E>
where
    E: std::fmt::Display + Clone,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[event {}]: {}", self.location, self.payload)
    }
}

/// A trait for types that can have an event-sequence position attached to
/// them.
pub trait Locatable
where
    Self: Sized,
{
    /// The return type with the attached position.
    type Located;

    /// Attach the position described by `step` (an index into the tracer's
    /// event sequence) to the error.
    fn locate(self, step: u64) -> Self::Located;
}

/// A blanket implementation that allows for attaching a position to any
/// result.
impl<T, E> Locatable for Result<T, E>
where
    E: std::error::Error + Clone,
{
    type Located = Result<T, Located<E>>;

    fn locate(self, step: u64) -> Self::Located {
        self.map_err(|e| Located {
            location: step,
            payload:  e,
        })
    }
}
