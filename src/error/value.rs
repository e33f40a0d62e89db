//! This module contains errors pertaining to the construction of
//! read-instruction DAGs.

use thiserror::Error;

use crate::value::Sort;

/// Errors that occur when building [`crate::value::ReadInstruction`] nodes
/// from ill-sorted operands.
///
/// These are rejected at the construction API; a node that exists is always
/// well sorted.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error("Operator `{operator}` expected an operand of sort {expected} but received {found}")]
    SortMismatch {
        operator: &'static str,
        expected: Sort,
        found:    Sort,
    },

    #[error("The arms of a ternary selection disagree: {if_true} versus {if_false}")]
    BranchSortMismatch { if_true: Sort, if_false: Sort },
}

/// The result type for methods that may have value-construction errors.
pub type Result<T> = std::result::Result<T, Error>;
