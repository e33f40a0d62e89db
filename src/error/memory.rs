//! This module contains errors pertaining to the construction of abstract
//! memory addresses.

use thiserror::Error;

/// Errors that occur when building [`crate::memory::Address`] values.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("An abstract address must contain at least one pointer")]
    EmptyAddress,
}

/// The result type for methods that may have address-construction errors.
pub type Result<T> = std::result::Result<T, Error>;
